use thiserror::Error;

/// Central error type for the Nexus pipeline library
#[derive(Error, Debug)]
pub enum NexusError {
    // ============================================================================
    // Stage Errors
    // ============================================================================
    #[error("Stage '{stage}' failed: {message}")]
    StageFailed { stage: String, message: String },

    #[error("Field lookup not supported on {0} value")]
    FieldLookupUnsupported(String),

    // ============================================================================
    // Pipeline Errors
    // ============================================================================
    #[error("No result field in {0}")]
    MissingResult(String),

    #[error("Pipeline not registered: {0}")]
    PipelineNotFound(String),

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Builder pattern validation error
    #[error("Builder error: {0}")]
    BuilderError(String),

    // ============================================================================
    // Serialization Errors
    // ============================================================================
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NexusError {
    /// Shorthand for a hard failure raised by a named stage
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        NexusError::StageFailed {
            stage: stage.into(),
            message: message.into(),
        }
    }
}

// Helper type alias for Results
pub type NexusResult<T> = Result<T, NexusError>;

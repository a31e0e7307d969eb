use crate::error::{NexusError, NexusResult};
use crate::logger::LogLevel;
use serde::{Deserialize, Serialize};

/// Default number of processing events kept in the manager history
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Manager configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Maximum number of history entries before the oldest are evicted
    pub history_capacity: usize,

    /// Minimum level for the in-memory logger, applied when the manager is built
    ///
    /// The logger is the process-wide `LOGGER`, so the level outlives the
    /// manager and affects every other manager in the process.
    pub min_log_level: Option<LogLevel>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            min_log_level: None,
        }
    }
}

impl ManagerConfig {
    pub fn builder() -> ManagerConfigBuilder {
        ManagerConfigBuilder::new()
    }

    /// Parse and validate a configuration from a JSON document
    pub fn from_json(json: &str) -> NexusResult<Self> {
        let config: ManagerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> NexusResult<()> {
        if self.history_capacity == 0 {
            return Err(NexusError::ConfigError(
                "history_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for constructing ManagerConfig instances with a fluent API
///
/// # Example
/// ```
/// use nexus_lib::config::ManagerConfigBuilder;
/// use nexus_lib::logger::LogLevel;
///
/// let config = ManagerConfigBuilder::new()
///     .history_capacity(50)
///     .min_log_level(LogLevel::Warn)
///     .build()
///     .unwrap();
/// assert_eq!(config.history_capacity, 50);
/// ```
#[derive(Debug, Default)]
pub struct ManagerConfigBuilder {
    history_capacity: Option<usize>,
    min_log_level: Option<LogLevel>,
}

impl ManagerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = Some(capacity);
        self
    }

    pub fn min_log_level(mut self, level: LogLevel) -> Self {
        self.min_log_level = Some(level);
        self
    }

    /// Build the ManagerConfig instance
    ///
    /// # Errors
    /// Returns `NexusError::BuilderError` if the history capacity is zero
    pub fn build(self) -> NexusResult<ManagerConfig> {
        let history_capacity = self.history_capacity.unwrap_or(DEFAULT_HISTORY_CAPACITY);
        if history_capacity == 0 {
            return Err(NexusError::BuilderError(
                "history_capacity must be greater than zero".to_string(),
            ));
        }

        Ok(ManagerConfig {
            history_capacity,
            min_log_level: self.min_log_level,
        })
    }
}

use super::core::{PipelineRun, PipelineStage, StageResult};
use super::record::Payload;
use super::stages::{InputStage, OutputStage, TransformStage};
use crate::logger::LogLevel;
use crate::nexus_log;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use uuid::Uuid;

/// Format label of a pipeline
///
/// Purely descriptive: every format runs its stages the same way. The manager
/// counts registrations per format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PipelineFormat {
    Json,
    Csv,
    Stream,
}

impl PipelineFormat {
    pub fn label(&self) -> &'static str {
        match self {
            PipelineFormat::Json => "JSON",
            PipelineFormat::Csv => "CSV",
            PipelineFormat::Stream => "Stream",
        }
    }
}

impl fmt::Display for PipelineFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordered sequence of stages applied to one input
///
/// Stages are appended during setup and only read while processing.
///
/// # Example
/// ```
/// use nexus_lib::pipeline::{Pipeline, PipelineFormat};
/// use serde_json::json;
///
/// let pipeline = Pipeline::standard("Pipeline A", PipelineFormat::Json);
/// let output = pipeline.process(json!({"sensor": "temp", "temp": 23.5}));
/// assert_eq!(output, "[Pipeline A] Processed temp reading: 23.5");
/// ```
pub struct Pipeline {
    id: String,
    format: PipelineFormat,
    stages: Vec<Box<dyn PipelineStage>>,
}

impl Pipeline {
    /// Create an empty pipeline
    pub fn new(id: impl Into<String>, format: PipelineFormat) -> Self {
        Self {
            id: id.into(),
            format,
            stages: Vec::new(),
        }
    }

    pub fn json(id: impl Into<String>) -> Self {
        Self::new(id, PipelineFormat::Json)
    }

    pub fn csv(id: impl Into<String>) -> Self {
        Self::new(id, PipelineFormat::Csv)
    }

    pub fn stream(id: impl Into<String>) -> Self {
        Self::new(id, PipelineFormat::Stream)
    }

    /// Pipeline with the input, transform and output stages in order
    pub fn standard(id: impl Into<String>, format: PipelineFormat) -> Self {
        Self::builder(id)
            .format(format)
            .add_stage(InputStage::new())
            .add_stage(TransformStage::new())
            .add_stage(OutputStage::new())
            .build()
    }

    /// Create a new pipeline builder
    pub fn builder(id: impl Into<String>) -> PipelineBuilder {
        PipelineBuilder::new(id)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn format(&self) -> PipelineFormat {
        self.format
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Append a stage to the end of the sequence
    pub fn add_stage<S: PipelineStage + 'static>(&mut self, stage: S) {
        self.stages.push(Box::new(stage));
    }

    pub fn add_boxed_stage(&mut self, stage: Box<dyn PipelineStage>) {
        self.stages.push(stage);
    }

    /// Run every stage and return the `[id] ...` result line
    ///
    /// Never fails: a broken stage is skipped and a missing result is
    /// reported as `[id] Error: ...`.
    pub fn process(&self, input: impl Into<Payload>) -> String {
        self.run(input).output
    }

    /// Run every stage and report how each one went
    ///
    /// A stage returning `Err` is logged and skipped; the payload it was given
    /// flows on to the next stage. After the last stage the `result` field is
    /// extracted into the output line.
    pub fn run(&self, input: impl Into<Payload>) -> PipelineRun {
        let run_id = Uuid::new_v4();
        let pipeline_start = Instant::now();
        let mut current: Payload = input.into();
        let mut stage_results = Vec::with_capacity(self.stages.len());

        nexus_log!(
            LogLevel::Debug,
            "pipeline",
            "Starting pipeline '{}' ({}) with {} stages (run: {})",
            self.id,
            self.format,
            self.stages.len(),
            run_id
        );

        for (index, stage) in self.stages.iter().enumerate() {
            let stage_name = stage.name();

            if stage.should_skip(&current) {
                nexus_log!(
                    LogLevel::Debug,
                    "pipeline",
                    "Skipping stage {}/{}: {} (run: {})",
                    index + 1,
                    self.stages.len(),
                    stage_name,
                    run_id
                );
                stage_results.push(StageResult::skipped(stage_name));
                continue;
            }

            let stage_start = Instant::now();
            match stage.process(&current) {
                Ok(next) => {
                    let duration = stage_start.elapsed();
                    let result = match next.error() {
                        Some(error) => StageResult::degraded(stage_name, error, duration),
                        None => StageResult::completed(stage_name, duration),
                    };
                    stage_results.push(result);
                    current = next;
                }
                Err(e) => {
                    let duration = stage_start.elapsed();
                    nexus_log!(
                        LogLevel::Warn,
                        "pipeline",
                        "Stage error detected: {}, recovering... (pipeline: {}, stage: {})",
                        e,
                        self.id,
                        stage_name
                    );
                    stage_results.push(StageResult::recovered(stage_name, e.to_string(), duration));
                }
            }
        }

        let output = match current.result() {
            Ok(result) => format!("[{}] {}", self.id, result),
            Err(e) => {
                nexus_log!(
                    LogLevel::Warn,
                    "pipeline",
                    "Pipeline '{}' produced no result: {} (run: {})",
                    self.id,
                    e,
                    run_id
                );
                format!("[{}] Error: {}", self.id, e)
            }
        };

        let total_duration = pipeline_start.elapsed();
        nexus_log!(
            LogLevel::Debug,
            "pipeline",
            "Pipeline '{}' finished in {:.3}ms (run: {})",
            self.id,
            total_duration.as_secs_f64() * 1000.0,
            run_id
        );

        PipelineRun {
            run_id,
            pipeline_id: self.id.clone(),
            output,
            payload: current,
            stage_results,
            total_duration,
        }
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("id", &self.id)
            .field("format", &self.format)
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Builder for constructing pipelines
pub struct PipelineBuilder {
    id: String,
    format: PipelineFormat,
    stages: Vec<Box<dyn PipelineStage>>,
}

impl PipelineBuilder {
    /// Create a new builder; the format defaults to JSON
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            format: PipelineFormat::Json,
            stages: Vec::new(),
        }
    }

    pub fn format(mut self, format: PipelineFormat) -> Self {
        self.format = format;
        self
    }

    /// Add a stage to the pipeline
    pub fn add_stage<S: PipelineStage + 'static>(mut self, stage: S) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Add a boxed stage to the pipeline
    pub fn add_boxed_stage(mut self, stage: Box<dyn PipelineStage>) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            id: self.id,
            format: self.format,
            stages: self.stages,
        }
    }
}

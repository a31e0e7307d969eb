use crate::error::NexusResult;
use std::time::Duration;
use uuid::Uuid;

use super::record::{Payload, StageKind};

/// A single stage in a pipeline
///
/// A stage maps one payload to the next. Data problems are reported in-band
/// as `Ok(Payload::Failed(..))` so the following stages still run. An `Err`
/// means the stage itself broke; the pipeline logs it and carries on with the
/// payload it had before the stage.
///
/// # Example
/// ```
/// use nexus_lib::error::NexusResult;
/// use nexus_lib::pipeline::{Payload, PipelineStage};
///
/// struct Passthrough;
///
/// impl PipelineStage for Passthrough {
///     fn process(&self, input: &Payload) -> NexusResult<Payload> {
///         Ok(input.clone())
///     }
///
///     fn name(&self) -> &str {
///         "Passthrough"
///     }
/// }
/// ```
pub trait PipelineStage: Send + Sync {
    /// Produce the next payload from the current one
    fn process(&self, input: &Payload) -> NexusResult<Payload>;

    /// Get stage name for logging and run reports
    fn name(&self) -> &str;

    /// Built-in behaviour this stage implements, if any
    fn kind(&self) -> Option<StageKind> {
        None
    }

    /// Check if this stage should be skipped for the given payload
    fn should_skip(&self, _input: &Payload) -> bool {
        false
    }
}

/// How a stage invocation ended
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    Completed,
    /// The stage returned a failure payload
    Degraded(String),
    /// The stage errored; the previous payload was kept
    Recovered(String),
    Skipped,
}

/// Result of a pipeline stage execution
#[derive(Debug, Clone)]
pub struct StageResult {
    pub stage_name: String,
    pub outcome: StageOutcome,
    pub duration: Duration,
}

impl StageResult {
    pub fn completed(stage_name: impl Into<String>, duration: Duration) -> Self {
        Self {
            stage_name: stage_name.into(),
            outcome: StageOutcome::Completed,
            duration,
        }
    }

    pub fn degraded(
        stage_name: impl Into<String>,
        error: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            stage_name: stage_name.into(),
            outcome: StageOutcome::Degraded(error.into()),
            duration,
        }
    }

    pub fn recovered(
        stage_name: impl Into<String>,
        error: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            stage_name: stage_name.into(),
            outcome: StageOutcome::Recovered(error.into()),
            duration,
        }
    }

    pub fn skipped(stage_name: impl Into<String>) -> Self {
        Self {
            stage_name: stage_name.into(),
            outcome: StageOutcome::Skipped,
            duration: Duration::from_secs(0),
        }
    }

    /// Error message for degraded or recovered stages
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            StageOutcome::Degraded(error) | StageOutcome::Recovered(error) => Some(error),
            StageOutcome::Completed | StageOutcome::Skipped => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.outcome == StageOutcome::Skipped
    }
}

/// Result of a complete pipeline run
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub run_id: Uuid,
    pub pipeline_id: String,

    /// Formatted `[pipeline_id] ...` line, identical to `Pipeline::process`
    pub output: String,

    /// Payload left after the last stage
    pub payload: Payload,

    pub stage_results: Vec<StageResult>,
    pub total_duration: Duration,
}

impl PipelineRun {
    /// Whether a result was extracted (as opposed to an `Error:` line)
    pub fn succeeded(&self) -> bool {
        self.payload.result().is_ok()
    }

    /// Get the number of stages that were executed (not skipped)
    pub fn executed_stages(&self) -> usize {
        self.stage_results.iter().filter(|r| !r.is_skipped()).count()
    }

    pub fn skipped_stages(&self) -> usize {
        self.stage_results.iter().filter(|r| r.is_skipped()).count()
    }

    pub fn degraded_stages(&self) -> usize {
        self.stage_results
            .iter()
            .filter(|r| matches!(r.outcome, StageOutcome::Degraded(_)))
            .count()
    }

    pub fn recovered_stages(&self) -> usize {
        self.stage_results
            .iter()
            .filter(|r| matches!(r.outcome, StageOutcome::Recovered(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::record::OutputRecord;

    fn run_with(payload: Payload, stage_results: Vec<StageResult>) -> PipelineRun {
        PipelineRun {
            run_id: Uuid::new_v4(),
            pipeline_id: "Pipeline A".to_string(),
            output: String::new(),
            payload,
            stage_results,
            total_duration: Duration::from_millis(3),
        }
    }

    #[test]
    fn test_stage_result_completed() {
        let result = StageResult::completed("Input", Duration::from_millis(1));
        assert_eq!(result.outcome, StageOutcome::Completed);
        assert!(result.error().is_none());
        assert!(!result.is_skipped());
    }

    #[test]
    fn test_stage_result_degraded() {
        let result = StageResult::degraded("Input", "Invalid or empty data", Duration::ZERO);
        assert_eq!(result.error(), Some("Invalid or empty data"));
    }

    #[test]
    fn test_stage_result_skipped() {
        let result = StageResult::skipped("Transform");
        assert!(result.is_skipped());
        assert_eq!(result.duration, Duration::from_secs(0));
    }

    #[test]
    fn test_run_counts() {
        let run = run_with(
            Payload::from("raw"),
            vec![
                StageResult::degraded("Input", "bad", Duration::ZERO),
                StageResult::recovered("Custom", "broke", Duration::ZERO),
                StageResult::skipped("Transform"),
                StageResult::completed("Output", Duration::ZERO),
            ],
        );

        assert_eq!(run.executed_stages(), 3);
        assert_eq!(run.skipped_stages(), 1);
        assert_eq!(run.degraded_stages(), 1);
        assert_eq!(run.recovered_stages(), 1);
        assert!(!run.succeeded());
    }

    #[test]
    fn test_run_succeeded_with_output() {
        let run = run_with(
            Payload::Output(OutputRecord {
                result: "done".to_string(),
            }),
            vec![StageResult::completed("Output", Duration::ZERO)],
        );
        assert!(run.succeeded());
    }
}

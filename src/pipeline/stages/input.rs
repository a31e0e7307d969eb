use crate::error::NexusResult;
use crate::logger::LogLevel;
use crate::nexus_log;
use crate::pipeline::record::{
    InputRecord, Payload, StageFailure, StageKind, DEFAULT_SENSOR, DEFAULT_TEMP,
};
use crate::pipeline::PipelineStage;
use serde_json::Value;

/// Error reported for inputs that are not a non-empty record
pub const INVALID_INPUT_ERROR: &str = "Invalid or empty data";

/// Stage that validates a raw reading
///
/// # Input
/// Any payload. Only a non-empty record is accepted.
///
/// # Output
/// - `validated: true`, `sensor` (default `"Unknown"`), `temp` (default `0.0`),
///   `data` (the record as received), `stage: "input"`
/// - otherwise `{validated: false, error: "Invalid or empty data", data: null}`
///
/// # Example
/// ```
/// use nexus_lib::pipeline::{Payload, PipelineStage};
/// use nexus_lib::pipeline::stages::InputStage;
/// use serde_json::json;
///
/// let out = InputStage::new()
///     .process(&Payload::from(json!({"sensor": "temp", "temp": 23.5})))
///     .unwrap();
/// assert_eq!(out.field("validated").unwrap(), json!(true));
/// ```
pub struct InputStage;

impl InputStage {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InputStage {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStage for InputStage {
    fn process(&self, input: &Payload) -> NexusResult<Payload> {
        let record = match input.as_record() {
            Some(record) if !record.is_empty() => record,
            _ => {
                nexus_log!(
                    LogLevel::Debug,
                    "pipeline::input",
                    "Rejected {} as input",
                    input.describe()
                );
                return Ok(Payload::Failed(StageFailure::new(
                    StageKind::Input,
                    INVALID_INPUT_ERROR,
                )));
            }
        };

        let sensor = record
            .get("sensor")
            .cloned()
            .unwrap_or_else(|| Value::from(DEFAULT_SENSOR));
        let temp = record
            .get("temp")
            .cloned()
            .unwrap_or_else(|| Value::from(DEFAULT_TEMP));

        Ok(Payload::Input(InputRecord {
            sensor,
            temp,
            data: record,
        }))
    }

    fn name(&self) -> &str {
        "Validate Input"
    }

    fn kind(&self) -> Option<StageKind> {
        Some(StageKind::Input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_input_stage_valid_reading() {
        let input = Payload::from(json!({"sensor": "temp", "temp": 23.5}));
        let output = InputStage::new().process(&input).unwrap();

        assert_eq!(
            output.to_value(),
            json!({
                "validated": true,
                "sensor": "temp",
                "temp": 23.5,
                "data": {"sensor": "temp", "temp": 23.5},
                "stage": "input"
            })
        );
    }

    #[test]
    fn test_input_stage_defaults_missing_fields() {
        let input = Payload::from(json!({"humidity": 40}));
        let output = InputStage::new().process(&input).unwrap();

        assert_eq!(output.field("sensor").unwrap(), json!("Unknown"));
        assert_eq!(output.field("temp").unwrap(), json!(0.0));
        assert_eq!(output.field("data").unwrap(), json!({"humidity": 40}));
    }

    #[test]
    fn test_input_stage_keeps_explicit_null() {
        let input = Payload::from(json!({"sensor": null, "temp": 1}));
        let output = InputStage::new().process(&input).unwrap();

        assert_eq!(output.field("sensor").unwrap(), Value::Null);
    }

    #[test]
    fn test_input_stage_rejects_string() {
        let output = InputStage::new()
            .process(&Payload::from("not-a-record"))
            .unwrap();

        assert_eq!(
            output.to_value(),
            json!({"validated": false, "error": "Invalid or empty data", "data": null})
        );
    }

    #[test]
    fn test_input_stage_rejects_empty_record() {
        let output = InputStage::new().process(&Payload::from(json!({}))).unwrap();
        assert!(output.is_failure());
        assert_eq!(output.error(), Some(INVALID_INPUT_ERROR));
    }

    #[test]
    fn test_input_stage_rejects_non_record_values() {
        for value in [json!(null), json!(42), json!([1, 2]), json!(true)] {
            let output = InputStage::new().process(&Payload::from(value)).unwrap();
            assert_eq!(output.field("validated").unwrap(), json!(false));
        }
    }

    #[test]
    fn test_input_stage_accepts_stage_records() {
        // A failure record is still a non-empty record
        let failed = Payload::Failed(StageFailure::new(StageKind::Output, "boom"));
        let output = InputStage::new().process(&failed).unwrap();

        assert_eq!(output.field("validated").unwrap(), json!(true));
        assert_eq!(output.field("sensor").unwrap(), json!("Unknown"));
    }

    #[test]
    fn test_input_stage_metadata() {
        let stage = InputStage::new();
        assert_eq!(stage.name(), "Validate Input");
        assert_eq!(stage.kind(), Some(StageKind::Input));
        assert!(!stage.should_skip(&Payload::from("x")));
    }
}

use crate::error::NexusResult;
use crate::logger::LogLevel;
use crate::nexus_log;
use crate::pipeline::record::{render_value, OutputRecord, Payload, StageFailure, StageKind};
use crate::pipeline::PipelineStage;

/// Render the result line for a reading
pub fn format_reading(sensor: &str, temp: &str) -> String {
    format!("Processed {} reading: {}", sensor, temp)
}

/// Stage that renders the final result string
///
/// Produces `{formatted: true, result: "Processed {sensor} reading: {temp}",
/// stage: "output"}`. Missing fields render as `None`.
pub struct OutputStage;

impl OutputStage {
    pub fn new() -> Self {
        Self
    }

    fn render(input: &Payload) -> NexusResult<String> {
        let sensor = input.field("sensor")?;
        let temp = input.field("temp")?;
        Ok(format_reading(&render_value(&sensor), &render_value(&temp)))
    }
}

impl Default for OutputStage {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStage for OutputStage {
    fn process(&self, input: &Payload) -> NexusResult<Payload> {
        match Self::render(input) {
            Ok(result) => Ok(Payload::Output(OutputRecord { result })),
            Err(e) => {
                nexus_log!(
                    LogLevel::Debug,
                    "pipeline::output",
                    "Cannot format {}: {}",
                    input.describe(),
                    e
                );
                Ok(Payload::Failed(StageFailure::new(
                    StageKind::Output,
                    e.to_string(),
                )))
            }
        }
    }

    fn name(&self) -> &str {
        "Format Output"
    }

    fn kind(&self) -> Option<StageKind> {
        Some(StageKind::Output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_output_formats_reading() {
        let output = OutputStage::new()
            .process(&Payload::from(json!({"sensor": "temp", "temp": 23.5})))
            .unwrap();

        assert_eq!(
            output.to_value(),
            json!({
                "formatted": true,
                "result": "Processed temp reading: 23.5",
                "stage": "output"
            })
        );
    }

    #[test]
    fn test_output_missing_fields_render_none() {
        let output = OutputStage::new().process(&Payload::from(json!({"x": 1}))).unwrap();
        assert_eq!(output.result().unwrap(), "Processed None reading: None");
    }

    #[test]
    fn test_output_numeric_sensor() {
        let output = OutputStage::new()
            .process(&Payload::from(json!({"sensor": 7, "temp": -4})))
            .unwrap();
        assert_eq!(output.result().unwrap(), "Processed 7 reading: -4");
    }

    #[test]
    fn test_output_structured_fields_render_as_json() {
        let output = OutputStage::new()
            .process(&Payload::from(json!({"sensor": true, "temp": {"a": 1}})))
            .unwrap();
        assert_eq!(output.result().unwrap(), r#"Processed true reading: {"a":1}"#);
    }

    #[test]
    fn test_output_bare_value() {
        let output = OutputStage::new().process(&Payload::from(json!(3.5))).unwrap();

        assert_eq!(
            output.to_value(),
            json!({
                "formatted": false,
                "error": "Field lookup not supported on number value",
                "stage": "output"
            })
        );
        assert!(output.result().is_err());
    }

    #[test]
    fn test_format_reading() {
        assert_eq!(format_reading("humidity", "40"), "Processed humidity reading: 40");
    }
}

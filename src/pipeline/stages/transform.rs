use crate::error::NexusResult;
use crate::logger::LogLevel;
use crate::nexus_log;
use crate::pipeline::record::{Payload, StageFailure, StageKind, TransformRecord};
use crate::pipeline::PipelineStage;

/// Stage that enriches a validated reading
///
/// Carries `sensor`, `temp`, `data` and `validated` forward unchanged
/// (`null` when missing) and adds `transformed: true` with a fixed
/// `metadata` annotation. Payloads without field lookup, such as a bare
/// string, produce `{transformed: false, error, stage: "transform"}`.
pub struct TransformStage;

impl TransformStage {
    pub fn new() -> Self {
        Self
    }

    fn enrich(input: &Payload) -> NexusResult<TransformRecord> {
        Ok(TransformRecord {
            sensor: input.field("sensor")?,
            temp: input.field("temp")?,
            data: input.field("data")?,
            validated: input.field("validated")?,
        })
    }
}

impl Default for TransformStage {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStage for TransformStage {
    fn process(&self, input: &Payload) -> NexusResult<Payload> {
        match Self::enrich(input) {
            Ok(record) => Ok(Payload::Transform(record)),
            Err(e) => {
                nexus_log!(
                    LogLevel::Debug,
                    "pipeline::transform",
                    "Cannot enrich {}: {}",
                    input.describe(),
                    e
                );
                Ok(Payload::Failed(StageFailure::new(
                    StageKind::Transform,
                    e.to_string(),
                )))
            }
        }
    }

    fn name(&self) -> &str {
        "Enrich Data"
    }

    fn kind(&self) -> Option<StageKind> {
        Some(StageKind::Transform)
    }
}

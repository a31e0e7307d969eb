//! Sequential record transformation pipelines
//!
//! A pipeline applies an ordered list of stages to one payload. Each stage
//! reads the fields it needs (with defaults when absent) and hands the next
//! payload on. Failures are tolerated at two levels: a stage that reports a
//! data problem returns a failure payload, and a stage that errors outright is
//! skipped while the previous payload flows on. The pipeline always returns a
//! `[id] ...` line.
//!
//! # Example
//! ```
//! use nexus_lib::error::NexusResult;
//! use nexus_lib::pipeline::stages::{InputStage, OutputStage};
//! use nexus_lib::pipeline::{Payload, Pipeline, PipelineStage};
//! use serde_json::json;
//!
//! // Define a custom stage
//! struct Celsius;
//!
//! impl PipelineStage for Celsius {
//!     fn process(&self, input: &Payload) -> NexusResult<Payload> {
//!         let mut record = input.as_record().unwrap_or_default();
//!         let fahrenheit = input.field("fahrenheit")?.as_f64().unwrap_or(32.0);
//!         record.insert("temp".into(), json!((fahrenheit - 32.0) * 5.0 / 9.0));
//!         Ok(Payload::from(record))
//!     }
//!
//!     fn name(&self) -> &str {
//!         "Celsius"
//!     }
//! }
//!
//! let pipeline = Pipeline::builder("converter")
//!     .add_stage(Celsius)
//!     .add_stage(InputStage::new())
//!     .add_stage(OutputStage::new())
//!     .build();
//!
//! let output = pipeline.process(json!({"sensor": "oven", "fahrenheit": 212.0}));
//! assert_eq!(output, "[converter] Processed oven reading: 100.0");
//! ```

pub mod core;
pub mod executor;
pub mod record;
pub mod stages;

// Re-export main types
pub use self::core::{PipelineRun, PipelineStage, StageOutcome, StageResult};
pub use executor::{Pipeline, PipelineBuilder, PipelineFormat};
pub use record::{Payload, Record, StageKind};

//! Built-in pipeline stages
//!
//! The canonical reading pipeline runs these in order:
//! 1. InputStage - Validate the raw record and extract `sensor`/`temp`
//! 2. TransformStage - Carry the reading forward with enrichment metadata
//! 3. OutputStage - Render the human-readable result line

pub mod input;
pub mod output;
pub mod transform;

// Re-export stages
pub use input::InputStage;
pub use output::OutputStage;
pub use transform::TransformStage;

//! Nexus: multi-stage record transformation pipelines
//!
//! A sensor reading enters as an open record, passes through validation,
//! enrichment and formatting stages, and leaves as a result line such as
//! `[Pipeline A] Processed temp reading: 23.5`. A [`manager::PipelineManager`]
//! fans one input out to many pipelines, chains pipelines together, and keeps
//! a bounded processing history with throughput statistics.

pub mod clock;
pub mod config;
pub mod error;
pub mod history;
pub mod logger;
pub mod manager;
pub mod pipeline;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ManagerConfig, ManagerConfigBuilder};
pub use error::{NexusError, NexusResult};
pub use manager::{HistoryEntry, ManagerStats, PipelineManager};
pub use pipeline::{Payload, Pipeline, PipelineFormat, PipelineStage, Record};

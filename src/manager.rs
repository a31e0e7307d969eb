use crate::clock::{elapsed_seconds, Clock, SystemClock};
use crate::config::ManagerConfig;
use crate::error::{NexusError, NexusResult};
use crate::history::BoundedHistory;
use crate::logger::{LogLevel, LOGGER};
use crate::nexus_log;
use crate::pipeline::{Payload, Pipeline, PipelineFormat, PipelineRun};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// One pipeline invocation recorded by `process_all`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub run_id: Uuid,
    pub pipeline_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Throughput snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ManagerStats {
    /// Entries currently held in the history
    pub records_processed: usize,

    /// Seconds since the manager was created, two decimals
    pub total_time: f64,

    /// `records_processed / total_time * 100`, two decimals, `0` before any time passes
    pub efficiency: f64,
}

/// Owns a set of pipelines and fans inputs out to all of them
///
/// # Example
/// ```
/// use nexus_lib::manager::PipelineManager;
/// use nexus_lib::pipeline::{Pipeline, PipelineFormat};
/// use serde_json::json;
///
/// let mut manager = PipelineManager::new();
/// manager.add_pipeline(Pipeline::standard("Pipeline A", PipelineFormat::Json));
/// manager.add_pipeline(Pipeline::standard("Pipeline B", PipelineFormat::Csv));
///
/// let results = manager.process_all(json!({"sensor": "temp", "temp": 23.5}));
/// assert_eq!(results[1], "[Pipeline B] Processed temp reading: 23.5");
/// assert_eq!(manager.get_stats().records_processed, 2);
/// ```
pub struct PipelineManager<C: Clock = SystemClock> {
    config: ManagerConfig,
    pipelines: Vec<Pipeline>,
    history: BoundedHistory<HistoryEntry>,
    kind_counts: BTreeMap<PipelineFormat, usize>,
    clock: C,
    started_at: DateTime<Utc>,
}

impl PipelineManager<SystemClock> {
    /// Manager with the default configuration and wall-clock time
    pub fn new() -> Self {
        Self::assemble(ManagerConfig::default(), SystemClock)
    }
}

impl Default for PipelineManager<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> PipelineManager<C> {
    /// Manager with an explicit configuration and time source
    ///
    /// A `min_log_level` in the configuration is applied to the process-wide
    /// [`LOGGER`], so it also filters entries from every other manager.
    ///
    /// # Errors
    /// Returns `NexusError::ConfigError` if the configuration is invalid
    pub fn with_config(config: ManagerConfig, clock: C) -> NexusResult<Self> {
        config.validate()?;

        if let Some(level) = config.min_log_level {
            LOGGER.set_min_level(level);
        }

        Ok(Self::assemble(config, clock))
    }

    fn assemble(config: ManagerConfig, clock: C) -> Self {
        let started_at = clock.now();
        Self {
            history: BoundedHistory::new(config.history_capacity),
            config,
            pipelines: Vec::new(),
            kind_counts: BTreeMap::new(),
            clock,
            started_at,
        }
    }

    /// Register a pipeline; duplicates are allowed
    pub fn add_pipeline(&mut self, pipeline: Pipeline) {
        *self.kind_counts.entry(pipeline.format()).or_insert(0) += 1;
        nexus_log!(
            LogLevel::Info,
            "manager",
            "Registered {} pipeline '{}' with {} stages",
            pipeline.format(),
            pipeline.id(),
            pipeline.stage_count()
        );
        self.pipelines.push(pipeline);
    }

    /// Apply `input` to every registered pipeline in registration order
    pub fn process_all(&mut self, input: impl Into<Payload>) -> Vec<String> {
        self.run_all(input)
            .into_iter()
            .map(|run| run.output)
            .collect()
    }

    /// Like `process_all` but returns the full run reports
    pub fn run_all(&mut self, input: impl Into<Payload>) -> Vec<PipelineRun> {
        let input: Payload = input.into();
        let mut runs = Vec::with_capacity(self.pipelines.len());

        for pipeline in &self.pipelines {
            let run = pipeline.run(input.clone());
            self.history.push(HistoryEntry {
                run_id: run.run_id,
                pipeline_id: run.pipeline_id.clone(),
                timestamp: self.clock.now(),
            });
            runs.push(run);
        }

        let failed = runs.iter().filter(|run| !run.succeeded()).count();
        nexus_log!(
            LogLevel::Info,
            "manager",
            "Processed {} through {} pipelines ({} without result)",
            input.describe(),
            runs.len(),
            failed
        );

        runs
    }

    /// Thread `input` through `sequence`, each output feeding the next pipeline
    ///
    /// The sequence does not have to be registered and may repeat pipelines.
    /// With an empty sequence the input comes back unchanged.
    pub fn chain_pipelines<'a, I>(&self, input: impl Into<Payload>, sequence: I) -> Payload
    where
        I: IntoIterator<Item = &'a Pipeline>,
    {
        let mut current: Payload = input.into();
        for pipeline in sequence {
            current = Payload::from(pipeline.process(current));
        }
        current
    }

    /// Chain registered pipelines looked up by id
    ///
    /// # Errors
    /// Returns `NexusError::PipelineNotFound` if any id is not registered
    pub fn chain_by_ids(&self, input: impl Into<Payload>, ids: &[&str]) -> NexusResult<Payload> {
        let sequence = ids
            .iter()
            .map(|id| {
                self.pipeline(id)
                    .ok_or_else(|| NexusError::PipelineNotFound(id.to_string()))
            })
            .collect::<NexusResult<Vec<_>>>()?;

        Ok(self.chain_pipelines(input, sequence))
    }

    pub fn get_stats(&self) -> ManagerStats {
        let records_processed = self.history.len();
        let elapsed = elapsed_seconds(self.started_at, self.clock.now());
        let efficiency = if elapsed > 0.0 {
            records_processed as f64 / elapsed * 100.0
        } else {
            0.0
        };

        ManagerStats {
            records_processed,
            total_time: round2(elapsed),
            efficiency: round2(efficiency),
        }
    }

    pub fn pipelines(&self) -> &[Pipeline] {
        &self.pipelines
    }

    /// First registered pipeline with the given id
    pub fn pipeline(&self, id: &str) -> Option<&Pipeline> {
        self.pipelines.iter().find(|p| p.id() == id)
    }

    pub fn history(&self) -> &BoundedHistory<HistoryEntry> {
        &self.history
    }

    /// Registrations per pipeline format
    pub fn kind_counts(&self) -> &BTreeMap<PipelineFormat, usize> {
        &self.kind_counts
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

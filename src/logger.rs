use crate::history::BoundedHistory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Number of entries retained by the in-memory logger
const LOG_CAPACITY: usize = 1000;

/// Log level enum for type-safe logging
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => LogLevel::Debug,
            1 => LogLevel::Info,
            2 => LogLevel::Warn,
            3 => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

/// Log entry with optional structured context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<HashMap<String, serde_json::Value>>,
}

/// In-memory diagnostic log
///
/// Keeps the most recent entries so callers can inspect what the pipelines
/// reported (recovered stage errors, fan-out summaries) without a subscriber.
pub struct Logger {
    buffer: Mutex<BoundedHistory<LogEntry>>,
    min_level: AtomicU8,
}

impl Logger {
    pub fn new() -> Self {
        Self::with_capacity(LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Mutex::new(BoundedHistory::new(capacity)),
            min_level: AtomicU8::new(LogLevel::Debug as u8),
        }
    }

    pub fn log(&self, level: LogLevel, message: &str, source: &str) {
        self.record(level, message, source, None);
    }

    /// Log with context (structured logging)
    pub fn log_with_context(
        &self,
        level: LogLevel,
        message: &str,
        source: &str,
        context: HashMap<String, serde_json::Value>,
    ) {
        self.record(level, message, source, Some(context));
    }

    fn record(
        &self,
        level: LogLevel,
        message: &str,
        source: &str,
        context: Option<HashMap<String, serde_json::Value>>,
    ) {
        if (level as u8) < self.min_level.load(Ordering::Relaxed) {
            return;
        }

        let entry = LogEntry {
            timestamp: Utc::now(),
            level,
            message: message.to_string(),
            source: source.to_string(),
            context,
        };

        // Poisoned buffer: drop the entry
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.push(entry);
        }
    }

    /// Set minimum log level (runtime filtering)
    pub fn set_min_level(&self, level: LogLevel) {
        self.min_level.store(level as u8, Ordering::Relaxed);
    }

    pub fn min_level(&self) -> LogLevel {
        LogLevel::from_u8(self.min_level.load(Ordering::Relaxed))
    }

    pub fn get_logs(&self) -> Vec<LogEntry> {
        self.buffer
            .lock()
            .map(|buffer| buffer.to_vec())
            .unwrap_or_default()
    }

    pub fn clear_logs(&self) {
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.clear();
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

/// Global logger instance
pub static LOGGER: once_cell::sync::Lazy<Logger> = once_cell::sync::Lazy::new(Logger::new);

/// Install a `tracing` subscriber honouring `RUST_LOG`
///
/// Safe to call more than once; only the first call installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,nexus_lib=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

// Macro for easy logging
#[macro_export]
macro_rules! nexus_log {
    ($level:expr, $source:expr, $($arg:tt)*) => {
        {
            let message = format!($($arg)*);
            $crate::logger::LOGGER.log($level, &message, $source);
            match $level {
                $crate::logger::LogLevel::Error => tracing::error!(target: "nexus_lib", source = $source, "{}", message),
                $crate::logger::LogLevel::Warn => tracing::warn!(target: "nexus_lib", source = $source, "{}", message),
                $crate::logger::LogLevel::Info => tracing::info!(target: "nexus_lib", source = $source, "{}", message),
                $crate::logger::LogLevel::Debug => tracing::debug!(target: "nexus_lib", source = $source, "{}", message),
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_round_trip() {
        for level in [LogLevel::Debug, LogLevel::Info, LogLevel::Warn, LogLevel::Error] {
            assert_eq!(LogLevel::parse(level.as_str()), Some(level));
        }
        assert_eq!(LogLevel::parse("verbose"), None);
    }

    #[test]
    fn test_min_level_filters_entries() {
        let logger = Logger::with_capacity(10);
        logger.set_min_level(LogLevel::Warn);

        logger.log(LogLevel::Info, "ignored", "test");
        logger.log(LogLevel::Error, "kept", "test");

        let logs = logger.get_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].message, "kept");
        assert_eq!(logger.min_level(), LogLevel::Warn);
    }

    #[test]
    fn test_buffer_is_bounded() {
        let logger = Logger::with_capacity(3);
        for i in 0..5 {
            logger.log(LogLevel::Info, &format!("entry {}", i), "test");
        }

        let messages: Vec<String> = logger.get_logs().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["entry 2", "entry 3", "entry 4"]);
    }

    #[test]
    fn test_log_with_context() {
        let logger = Logger::with_capacity(4);
        let mut context = HashMap::new();
        context.insert("pipeline_id".to_string(), serde_json::json!("Pipeline A"));
        logger.log_with_context(LogLevel::Debug, "fan-out", "manager", context);

        let logs = logger.get_logs();
        let ctx = logs[0].context.as_ref().unwrap();
        assert_eq!(ctx["pipeline_id"], "Pipeline A");
    }

    #[test]
    fn test_clear_logs() {
        let logger = Logger::with_capacity(4);
        logger.log(LogLevel::Info, "one", "test");
        logger.clear_logs();
        assert!(logger.get_logs().is_empty());
    }

    #[test]
    fn test_macro_records_into_global_logger() {
        crate::nexus_log!(LogLevel::Error, "logger-test", "reading {} rejected", 7);

        let logged = LOGGER.get_logs().into_iter().any(|entry| {
            entry.level == LogLevel::Error
                && entry.source == "logger-test"
                && entry.message == "reading 7 rejected"
        });
        assert!(logged);
    }

    #[test]
    fn test_level_serializes_lowercase() {
        let json = serde_json::to_string(&LogLevel::Warn).unwrap();
        assert_eq!(json, "\"warn\"");
    }
}

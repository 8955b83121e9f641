//! Structured log sink handed to the monitor
//!
//! The monitor never writes to the console itself. It emits [`LogRecord`]s
//! into whatever [`LogSink`] it was constructed with: [`TracingSink`] in the
//! CLI, [`MemorySink`] in tests.

use std::fmt;
use std::sync::Mutex;

use tracing_subscriber::{fmt as fmt_layer, prelude::*, EnvFilter};

use crate::models::EventSeverity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl From<EventSeverity> for Level {
    fn from(severity: EventSeverity) -> Self {
        match severity {
            EventSeverity::Info => Level::Info,
            EventSeverity::Warning => Level::Warn,
            EventSeverity::Error => Level::Error,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Debug => write!(f, "debug"),
            Level::Info => write!(f, "info"),
            Level::Warn => write!(f, "warn"),
            Level::Error => write!(f, "error"),
        }
    }
}

/// A single structured log record.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub level: Level,
    pub message: String,
    pub fields: Vec<(&'static str, String)>,
}

impl LogRecord {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.fields.push((key, value.to_string()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Destination for structured log records.
pub trait LogSink: Send + Sync {
    fn record(&self, record: LogRecord);
}

/// Forwards records to the global `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

struct Fields<'a>(&'a [(&'static str, String)]);

impl fmt::Display for Fields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            if value.contains(char::is_whitespace) {
                write!(f, "{key}={value:?}")?;
            } else {
                write!(f, "{key}={value}")?;
            }
        }
        Ok(())
    }
}

impl LogSink for TracingSink {
    fn record(&self, record: LogRecord) {
        let fields = Fields(&record.fields);
        match record.level {
            Level::Debug => tracing::debug!(target: "stackwatch", %fields, "{}", record.message),
            Level::Info => tracing::info!(target: "stackwatch", %fields, "{}", record.message),
            Level::Warn => tracing::warn!(target: "stackwatch", %fields, "{}", record.message),
            Level::Error => tracing::error!(target: "stackwatch", %fields, "{}", record.message),
        }
    }
}

/// Adds fixed fields to every record before passing it on.
///
/// Fields the record already carries are left alone.
pub struct ScopedSink<'a> {
    inner: &'a dyn LogSink,
    fields: Vec<(&'static str, String)>,
}

impl<'a> ScopedSink<'a> {
    pub fn new(inner: &'a dyn LogSink) -> Self {
        Self {
            inner,
            fields: Vec::new(),
        }
    }

    pub fn with(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.fields.push((key, value.to_string()));
        self
    }
}

impl LogSink for ScopedSink<'_> {
    fn record(&self, mut record: LogRecord) {
        for (key, value) in &self.fields {
            if record.get(key).is_none() {
                record.fields.push((key, value.clone()));
            }
        }
        self.inner.record(record);
    }
}

/// Keeps every record in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn at_level(&self, level: Level) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.level == level)
            .collect()
    }

    /// Records that carry the given field, in emission order
    pub fn with_field(&self, key: &str) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.get(key).is_some())
            .collect()
    }
}

impl LogSink for MemorySink {
    fn record(&self, record: LogRecord) {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record);
    }
}

/// Install the global `tracing` subscriber for the CLI.
///
/// Logs go to stderr so stdout stays clean for `--json` output. `RUST_LOG`
/// takes precedence over the verbosity flag.
pub fn init_tracing(verbose: bool) {
    let default = if verbose {
        "stackwatch=debug"
    } else {
        "stackwatch=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(
            fmt_layer::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .try_init();
}

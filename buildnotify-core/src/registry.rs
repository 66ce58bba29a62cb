//! Process-wide notification settings.
//!
//! A single [`Registry`] holds the log level, the log sink, and the default
//! reporter. Writes are last-writer-wins and every invocation reads the
//! current values; nothing is cached by transforms.

use std::fmt;
use std::sync::Arc;

use buildnotify_telemetry::{LogSink, TracingSink};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use thiserror::Error;

use crate::reporter::{self, Reporter};

/// Which notifications are passed to the log sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum LogLevel {
    Silent = 0,
    ErrorsOnly = 1,
    #[default]
    All = 2,
}

impl LogLevel {
    /// Whether a notification sourced from an error (or not) gets logged.
    pub fn allows(self, is_error: bool) -> bool {
        match self {
            LogLevel::Silent => false,
            LogLevel::ErrorsOnly => is_error,
            LogLevel::All => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid log level {0}, expected 0, 1 or 2")]
pub struct InvalidLogLevel(pub u8);

impl TryFrom<u8> for LogLevel {
    type Error = InvalidLogLevel;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(LogLevel::Silent),
            1 => Ok(LogLevel::ErrorsOnly),
            2 => Ok(LogLevel::All),
            other => Err(InvalidLogLevel(other)),
        }
    }
}

impl From<LogLevel> for u8 {
    fn from(level: LogLevel) -> Self {
        level as u8
    }
}

pub struct Registry {
    log_level: RwLock<LogLevel>,
    logger: RwLock<Arc<dyn LogSink>>,
    default_reporter: RwLock<Option<Arc<dyn Reporter>>>,
}

static GLOBAL: Lazy<Arc<Registry>> = Lazy::new(|| Arc::new(Registry::new()));

impl Registry {
    /// Fresh registry with the startup defaults: log everything through
    /// [`TracingSink`], report through the platform default reporter.
    pub fn new() -> Self {
        Self {
            log_level: RwLock::new(LogLevel::default()),
            logger: RwLock::new(Arc::new(TracingSink)),
            default_reporter: RwLock::new(Some(reporter::platform_default())),
        }
    }

    /// The registry shared by every transform that was not given its own.
    pub fn global() -> Arc<Registry> {
        GLOBAL.clone()
    }

    pub fn log_level(&self) -> LogLevel {
        *self.log_level.read()
    }

    pub fn set_log_level(&self, level: LogLevel) {
        *self.log_level.write() = level;
    }

    pub fn logger(&self) -> Arc<dyn LogSink> {
        self.logger.read().clone()
    }

    pub fn set_logger(&self, sink: Arc<dyn LogSink>) {
        *self.logger.write() = sink;
    }

    pub fn default_reporter(&self) -> Option<Arc<dyn Reporter>> {
        self.default_reporter.read().clone()
    }

    pub fn set_default_reporter(&self, reporter: Arc<dyn Reporter>) {
        *self.default_reporter.write() = Some(reporter);
    }

    /// Leaves the registry without a default; transforms without their own
    /// reporter then fail with `NoReporterConfigured`.
    pub fn clear_default_reporter(&self) {
        *self.default_reporter.write() = None;
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("log_level", &self.log_level())
            .field("default_reporter", &self.default_reporter.read().is_some())
            .finish_non_exhaustive()
    }
}

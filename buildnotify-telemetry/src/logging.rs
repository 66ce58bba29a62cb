//! ## buildnotify-telemetry::logging
//! **Structured logging with `tracing`**
//!
//! Two concerns live here:
//! - `EventLogger::init_with_filter` installs the process subscriber (env filter, thread names).
//! - `LogSink` is the boundary through which resolved notifications are surfaced
//!   as log lines. The default `TracingSink` routes them into `tracing`.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global subscriber with `default_filter` used when `RUST_LOG` is unset.
    ///
    /// Calling this twice is harmless; the second install is ignored.
    pub fn init_with_filter(default_filter: &str) {
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(default_filter)),
            )
            .with_thread_names(true)
            .with_span_events(FmtSpan::NONE)
            .try_init();
    }
}

/// Receives `(tag, title, message)` for every notification the log level lets through.
pub trait LogSink: Send + Sync {
    fn log(&self, tag: &str, title: &str, message: &str);
}

impl<F> LogSink for F
where
    F: Fn(&str, &str, &str) + Send + Sync,
{
    fn log(&self, tag: &str, title: &str, message: &str) {
        self(tag, title, message)
    }
}

/// Default sink: one `tracing` event per notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, tag: &str, title: &str, message: &str) {
        tracing::info!(tag, title, "{message}");
    }
}

//! # buildnotify Telemetry
//!
//! Crate for logging, the pluggable notification log sink, and metrics.

pub mod logging;
pub mod metrics;

pub use logging::{EventLogger, LogSink, TracingSink};
pub use metrics::MetricsRecorder;

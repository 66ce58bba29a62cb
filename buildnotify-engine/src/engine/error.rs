use buildnotify_core::registry::InvalidLogLevel;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Downstream receiver closed before the stream ended")]
    DownstreamClosed,

    #[error("Configuration error: {0}")]
    LogLevel(#[from] InvalidLogLevel),
}

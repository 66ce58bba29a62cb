//! # buildnotify-engine
//!
//! Stream side of build notifications: the notify transform, the error
//! notification entry point, and the factories that build them.

pub mod engine;

pub use engine::{
    apply_settings, config_from_settings, error_config_from_settings, log_level, logger, notify, on_error, pump,
    set_log_level, set_logger, with_reporter, ArtifactSource, BoundNotify, EngineError,
    ErrorChannel, ErrorNotifier, NotifyTransform, TransformStats,
};

mod error;
mod factory;
mod on_error;
mod settings;
mod source;
mod transform;

#[cfg(test)]
pub(crate) mod test_support;

pub use self::{
    error::EngineError,
    factory::{
        log_level, logger, notify, on_error, set_log_level, set_logger, with_reporter,
        BoundNotify,
    },
    on_error::ErrorNotifier,
    settings::{apply_settings, config_from_settings, error_config_from_settings},
    source::{pump, ArtifactSource},
    transform::{ErrorChannel, NotifyTransform, TransformStats},
};

pub mod prelude {
    pub use super::{
        notify, on_error, with_reporter, BoundNotify, EngineError, ErrorNotifier,
        NotifyTransform, TransformStats,
    };
}

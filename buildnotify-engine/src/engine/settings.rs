//! Wiring from loaded [`Settings`] into the registry and notify configuration.

use buildnotify_config::{NotifySettings, Settings};
use buildnotify_core::options::{NotifyConfig, NotifyOptions};
use buildnotify_core::registry::{LogLevel, Registry};
use tracing::debug;

use super::EngineError;

/// Applies the process-wide parts of `settings` to `registry`.
pub fn apply_settings(registry: &Registry, settings: &Settings) -> Result<(), EngineError> {
    let level = LogLevel::try_from(settings.telemetry.logging.level)?;
    debug!(?level, "Applying notification log level");
    registry.set_log_level(level);
    Ok(())
}

/// Structured configuration equivalent to the static file settings.
pub fn config_from_settings(settings: &NotifySettings) -> NotifyConfig {
    let mut opts = NotifyOptions::new().on_last(settings.on_last);
    if let Some(title) = &settings.title {
        opts = opts.title(title.as_str());
    }
    if let Some(message) = &settings.message {
        opts = opts.message(message.as_str());
    }
    opts.template_options = settings.template_options.clone();
    NotifyConfig::Options(opts)
}

/// Configuration for an error notifier built from the same settings.
///
/// Artifact title and message are left out; an error falls back to its own
/// defaults unless `notify.on_error` names text for it.
pub fn error_config_from_settings(settings: &NotifySettings) -> NotifyConfig {
    let mut opts = NotifyOptions::new();
    if let Some(title) = &settings.on_error.title {
        opts = opts.title(title.as_str());
    }
    if let Some(message) = &settings.on_error.message {
        opts = opts.message(message.as_str());
    }
    opts.template_options = settings.template_options.clone();
    NotifyConfig::Options(opts)
}

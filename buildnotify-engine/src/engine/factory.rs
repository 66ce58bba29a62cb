//! Entry points and process-wide settings.
//!
//! `notify`/`on_error` use the registry's default reporter unless the
//! configuration names one. [`with_reporter`] fixes the reporter instead.

use std::sync::Arc;

use buildnotify_core::options::NotifyConfig;
use buildnotify_core::registry::{LogLevel, Registry};
use buildnotify_core::reporter::Reporter;
use buildnotify_telemetry::LogSink;

use super::{ErrorChannel, ErrorNotifier, NotifyTransform};

/// Builds a notify transform on the global registry.
pub fn notify(config: impl Into<NotifyConfig>) -> (NotifyTransform, ErrorChannel) {
    NotifyTransform::new(config)
}

/// Builds an error notifier on the global registry.
pub fn on_error(config: impl Into<NotifyConfig>) -> ErrorNotifier {
    ErrorNotifier::new(config)
}

/// Binds `reporter` into every transform and error notifier built from the result.
pub fn with_reporter(reporter: Arc<dyn Reporter>) -> BoundNotify {
    BoundNotify {
        reporter,
        registry: Registry::global(),
    }
}

pub fn set_log_level(level: LogLevel) {
    Registry::global().set_log_level(level)
}

pub fn log_level() -> LogLevel {
    Registry::global().log_level()
}

pub fn set_logger(sink: Arc<dyn LogSink>) {
    Registry::global().set_logger(sink)
}

pub fn logger() -> Arc<dyn LogSink> {
    Registry::global().logger()
}

/// Factory with a fixed reporter.
///
/// Any reporter named in the caller's configuration is replaced; string and
/// computed shorthands become the record's message.
#[derive(Clone)]
pub struct BoundNotify {
    reporter: Arc<dyn Reporter>,
    registry: Arc<Registry>,
}

impl BoundNotify {
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn notify(&self, config: impl Into<NotifyConfig>) -> (NotifyTransform, ErrorChannel) {
        let (transform, errors) = NotifyTransform::new(self.bind(config));
        (transform.with_registry(self.registry.clone()), errors)
    }

    pub fn on_error(&self, config: impl Into<NotifyConfig>) -> ErrorNotifier {
        ErrorNotifier::new(self.bind(config)).with_registry(self.registry.clone())
    }

    fn bind(&self, config: impl Into<NotifyConfig>) -> NotifyConfig {
        config.into().with_notifier(self.reporter.clone())
    }
}

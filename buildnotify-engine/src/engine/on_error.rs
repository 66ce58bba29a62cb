//! Error notification entry point.
//!
//! Attached to an upstream pipeline's error channel rather than its data
//! channel. It reports each error and forwards nothing.

use std::sync::Arc;

use buildnotify_core::invoke::dispatch;
use buildnotify_core::item::{BuildError, Subject};
use buildnotify_core::options::NotifyConfig;
use buildnotify_core::registry::Registry;
use buildnotify_core::NotifyError;
use tokio::sync::mpsc;
use tracing::{instrument, warn};

#[derive(Clone)]
pub struct ErrorNotifier {
    config: Arc<NotifyConfig>,
    registry: Arc<Registry>,
}

impl ErrorNotifier {
    pub fn new(config: impl Into<NotifyConfig>) -> Self {
        Self {
            config: Arc::new(config.into()),
            registry: Registry::global(),
        }
    }

    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    /// Resolves and reports one upstream error with the error defaults.
    #[instrument(skip_all, fields(error = %error))]
    pub async fn notify(&self, error: &BuildError) -> Result<(), NotifyError> {
        let fallback = self.registry.default_reporter();
        dispatch(
            &self.config,
            Subject::Error(error),
            fallback.as_ref(),
            &self.registry,
        )
        .await
        .map(|_| ())
    }

    /// Reports every error received until `errors` closes. Returns how many were handled.
    ///
    /// Reporting failures are logged and otherwise dropped.
    pub async fn attach(self, mut errors: mpsc::Receiver<BuildError>) -> usize {
        let mut handled = 0;
        while let Some(error) = errors.recv().await {
            if let Err(err) = self.notify(&error).await {
                warn!(upstream = %error, "Error notification failed: {err}");
            }
            handled += 1;
        }
        handled
    }
}

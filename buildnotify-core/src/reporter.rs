//! The reporting capability: whatever actually shows a notification to the user.

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::error::{BoxError, ReporterError};
use crate::notification::Notification;

/// Displays a resolved notification.
///
/// Implementations may fail by returning an error or by panicking; the
/// invoker folds both into [`ReporterError`].
#[async_trait]
pub trait Reporter: Send + Sync {
    async fn report(&self, notification: &Notification) -> Result<(), ReporterError>;
}

#[async_trait]
impl<R> Reporter for Arc<R>
where
    R: Reporter + ?Sized,
{
    async fn report(&self, notification: &Notification) -> Result<(), ReporterError> {
        (**self).report(notification).await
    }
}

/// Completion handle given to callback-style reporters.
///
/// Dropping it without calling [`Done::succeed`] or [`Done::fail`] is reported
/// as [`ReporterError::Abandoned`].
#[derive(Debug)]
pub struct Done {
    tx: oneshot::Sender<Result<(), BoxError>>,
}

impl Done {
    pub fn succeed(self) {
        self.complete(Ok(()))
    }

    pub fn fail(self, err: impl Into<BoxError>) {
        self.complete(Err(err.into()))
    }

    pub fn complete(self, result: Result<(), BoxError>) {
        // Receiver gone means the invocation was already abandoned.
        let _ = self.tx.send(result);
    }
}

/// Adapts a `(notification, done) -> Result` closure into a [`Reporter`].
///
/// The closure may fail synchronously by returning `Err`, or later through
/// `done.fail(..)`. Both surface identically.
pub struct CallbackReporter<F> {
    callback: F,
}

impl<F> CallbackReporter<F>
where
    F: Fn(Notification, Done) -> Result<(), BoxError> + Send + Sync + 'static,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }

    pub fn shared(callback: F) -> Arc<dyn Reporter> {
        Arc::new(Self::new(callback))
    }
}

#[async_trait]
impl<F> Reporter for CallbackReporter<F>
where
    F: Fn(Notification, Done) -> Result<(), BoxError> + Send + Sync + 'static,
{
    async fn report(&self, notification: &Notification) -> Result<(), ReporterError> {
        let (tx, rx) = oneshot::channel();
        (self.callback)(notification.clone(), Done { tx }).map_err(ReporterError::Failed)?;

        match rx.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(ReporterError::Failed(err)),
            Err(_) => Err(ReporterError::Abandoned),
        }
    }
}

/// Prints `[title] message` on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    fn write(notification: &Notification) -> std::io::Result<()> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{notification}")?;
        out.flush()
    }
}

#[async_trait]
impl Reporter for ConsoleReporter {
    async fn report(&self, notification: &Notification) -> Result<(), ReporterError> {
        Self::write(notification).map_err(ReporterError::failed)
    }
}

/// Desktop notification through the platform notification service.
#[cfg(feature = "desktop")]
#[derive(Debug, Clone)]
pub struct DesktopReporter {
    app_name: String,
}

#[cfg(feature = "desktop")]
impl DesktopReporter {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }
}

#[cfg(feature = "desktop")]
impl Default for DesktopReporter {
    fn default() -> Self {
        Self::new(crate::error::PLUGIN_NAME)
    }
}

#[cfg(feature = "desktop")]
#[async_trait]
impl Reporter for DesktopReporter {
    async fn report(&self, notification: &Notification) -> Result<(), ReporterError> {
        let app_name = self.app_name.clone();
        let notification = notification.clone();

        tokio::task::spawn_blocking(move || {
            notify_rust::Notification::new()
                .appname(&app_name)
                .summary(&notification.title)
                .body(&notification.message)
                .show()
                .map(|_| ())
        })
        .await
        .map_err(|e| ReporterError::Panicked(e.to_string()))?
        .map_err(ReporterError::failed)
    }
}

/// Reporter installed in the registry at process start.
pub fn platform_default() -> Arc<dyn Reporter> {
    #[cfg(feature = "desktop")]
    {
        Arc::new(DesktopReporter::default())
    }
    #[cfg(not(feature = "desktop"))]
    {
        Arc::new(ConsoleReporter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note() -> Notification {
        Notification::new("Build notification", "dist/app.js")
    }

    #[tokio::test]
    async fn callback_success() {
        let reporter = CallbackReporter::new(|n: Notification, done: Done| {
            assert_eq!(n.message, "dist/app.js");
            done.succeed();
            Ok(())
        });
        reporter.report(&note()).await.unwrap();
    }

    #[tokio::test]
    async fn callback_failure_through_done() {
        let reporter = CallbackReporter::new(|_, done: Done| {
            done.fail("daemon unavailable");
            Ok(())
        });
        let err = reporter.report(&note()).await.unwrap_err();
        assert_eq!(err.to_string(), "daemon unavailable");
    }

    #[tokio::test]
    async fn synchronous_failure_matches_callback_failure() {
        let reporter = CallbackReporter::new(|_, _done: Done| Err("daemon unavailable".into()));
        let err = reporter.report(&note()).await.unwrap_err();
        assert!(matches!(err, ReporterError::Failed(_)));
        assert_eq!(err.to_string(), "daemon unavailable");
    }

    #[tokio::test]
    async fn completion_can_arrive_later() {
        let reporter = CallbackReporter::new(|_, done: Done| {
            tokio::spawn(async move {
                tokio::task::yield_now().await;
                done.succeed();
            });
            Ok(())
        });
        reporter.report(&note()).await.unwrap();
    }

    #[tokio::test]
    async fn dropped_handle_is_abandoned() {
        let reporter = CallbackReporter::new(|_, done: Done| {
            drop(done);
            Ok(())
        });
        assert!(matches!(
            reporter.report(&note()).await,
            Err(ReporterError::Abandoned)
        ));
    }

    #[tokio::test]
    async fn console_reporter_succeeds() {
        ConsoleReporter.report(&note()).await.unwrap();
    }
}

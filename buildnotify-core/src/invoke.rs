//! Single isolated call into a reporter.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, error, instrument};

use crate::error::{NotifyError, ReporterError, PLUGIN_NAME};
use crate::item::Subject;
use crate::notification::Notification;
use crate::options::NotifyConfig;
use crate::registry::Registry;
use crate::reporter::Reporter;
use crate::resolve::resolve;

/// What happened to one notification request that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Reported,
    /// Message resolved empty; no log line, no reporter call.
    Suppressed,
}

/// Logs `notification` per the registry's level, then hands it to `reporter` once.
///
/// The reporter runs in its own task so a panic inside it is reported as
/// [`ReporterError::Panicked`] instead of unwinding into the caller. A returned
/// error, a failed completion handle and a panic all come back as
/// [`NotifyError::Reporter`].
#[instrument(skip_all, level = "debug", fields(title = %notification.title))]
pub async fn invoke(
    reporter: Option<&Arc<dyn Reporter>>,
    notification: Notification,
    is_error: bool,
    registry: &Registry,
) -> Result<(), NotifyError> {
    if registry.log_level().allows(is_error) {
        log_notification(registry, &notification);
    }

    let reporter = reporter.cloned().ok_or(NotifyError::NoReporterConfigured)?;

    debug!("Handing notification to reporter");
    let task = tokio::spawn(async move { reporter.report(&notification).await });

    match task.await {
        Ok(result) => result.map_err(NotifyError::from),
        Err(join) if join.is_panic() => Err(ReporterError::Panicked(panic_message(
            join.into_panic().as_ref(),
        ))
        .into()),
        Err(join) => Err(ReporterError::failed(join).into()),
    }
}

/// Resolves `subject` against `config` and, unless suppressed, invokes the reporter.
///
/// `fallback` is used when the configuration names no reporter of its own.
pub async fn dispatch(
    config: &NotifyConfig,
    subject: Subject<'_>,
    fallback: Option<&Arc<dyn Reporter>>,
    registry: &Registry,
) -> Result<Outcome, NotifyError> {
    let is_error = subject.is_error();
    let Some(notification) = resolve(config, subject)? else {
        debug!("Notification suppressed by empty message");
        return Ok(Outcome::Suppressed);
    };

    let reporter = config.notifier().or(fallback);
    invoke(reporter, notification, is_error, registry).await?;
    Ok(Outcome::Reported)
}

fn log_notification(registry: &Registry, notification: &Notification) {
    let sink = registry.logger();
    let logged = catch_unwind(AssertUnwindSafe(|| {
        sink.log(PLUGIN_NAME, &notification.title, &notification.message)
    }));

    if let Err(panic) = logged {
        error!("Log sink panicked: {}", panic_message(panic.as_ref()));
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}

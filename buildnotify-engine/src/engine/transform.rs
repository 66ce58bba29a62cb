//! Notify transform: observes artifacts, reports, and forwards every item unchanged.
//!
//! Two modes, fixed at construction:
//! - per item: each artifact is resolved and reported, then forwarded.
//! - on last: artifacts are forwarded immediately and the most recent one is
//!   buffered; it is reported once when the upstream ends.
//!
//! Reporter failures never stop the stream. They are logged, counted and sent
//! on the transform's [`ErrorChannel`].

use std::sync::Arc;
use std::time::Instant;

use buildnotify_core::invoke::{dispatch, Outcome};
use buildnotify_core::item::{Artifact, Subject};
use buildnotify_core::options::NotifyConfig;
use buildnotify_core::registry::Registry;
use buildnotify_core::NotifyError;
use buildnotify_telemetry::MetricsRecorder;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::EngineError;

/// Receiving half of a transform's failure channel.
pub type ErrorChannel = mpsc::UnboundedReceiver<NotifyError>;

/// Counters for one run of a transform.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TransformStats {
    pub received: usize,
    pub forwarded: usize,
    pub notified: usize,
    pub failed: usize,
    pub suppressed: usize,
}

pub struct NotifyTransform {
    config: Arc<NotifyConfig>,
    registry: Arc<Registry>,
    metrics: Option<Arc<MetricsRecorder>>,
    last: Option<Arc<Artifact>>,
    errors: mpsc::UnboundedSender<NotifyError>,
    stats: TransformStats,
}

impl NotifyTransform {
    /// Builds a transform using the global registry, plus the receiver for its failures.
    pub fn new(config: impl Into<NotifyConfig>) -> (Self, ErrorChannel) {
        let (errors, error_rx) = mpsc::unbounded_channel();
        let transform = Self {
            config: Arc::new(config.into()),
            registry: Registry::global(),
            metrics: None,
            last: None,
            errors,
            stats: TransformStats::default(),
        };
        (transform, error_rx)
    }

    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRecorder>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn on_last(&self) -> bool {
        self.config.on_last()
    }

    pub fn stats(&self) -> TransformStats {
        self.stats
    }

    /// Handles one upstream item and returns it for forwarding.
    ///
    /// In per-item mode the notification completes (or fails) first, so a
    /// reporter that never completes holds the stream; in on-last mode the
    /// item is only buffered.
    pub async fn push(&mut self, item: Arc<Artifact>) -> Arc<Artifact> {
        self.stats.received += 1;

        if self.on_last() {
            self.last = Some(item.clone());
        } else {
            self.notify(&item).await;
        }

        self.stats.forwarded += 1;
        item
    }

    /// Signals end-of-stream. In on-last mode this reports the buffered item, if any.
    pub async fn finish(&mut self) -> TransformStats {
        if let Some(last) = self.last.take() {
            debug!("Reporting last item {}", last.path().display());
            self.notify(&last).await;
        }
        self.stats
    }

    /// Drives the transform until `input` closes, forwarding everything to `output`.
    ///
    /// `output` is dropped after the final notification, which ends the
    /// downstream stream.
    #[instrument(skip_all)]
    pub async fn run(
        mut self,
        mut input: mpsc::Receiver<Arc<Artifact>>,
        output: mpsc::Sender<Arc<Artifact>>,
    ) -> Result<TransformStats, EngineError> {
        debug!(on_last = self.on_last(), "Notify stream started");
        while let Some(item) = input.recv().await {
            let item = self.push(item).await;
            output
                .send(item)
                .await
                .map_err(|_| EngineError::DownstreamClosed)?;
        }

        let stats = self.finish().await;
        info!(
            received = stats.received,
            notified = stats.notified,
            failed = stats.failed,
            "Notify stream finished"
        );
        Ok(stats)
    }

    /// Spawns [`NotifyTransform::run`] and returns the downstream receiver.
    pub fn spawn(
        self,
        input: mpsc::Receiver<Arc<Artifact>>,
        capacity: usize,
    ) -> (
        mpsc::Receiver<Arc<Artifact>>,
        JoinHandle<Result<TransformStats, EngineError>>,
    ) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(self.run(input, tx));
        (rx, handle)
    }

    async fn notify(&mut self, item: &Artifact) {
        let fallback = self.registry.default_reporter();
        let started = Instant::now();

        let result = dispatch(
            &self.config,
            Subject::Artifact(item),
            fallback.as_ref(),
            &self.registry,
        )
        .await;

        match result {
            Ok(Outcome::Reported) => {
                self.stats.notified += 1;
                if let Some(metrics) = &self.metrics {
                    metrics.inc_notifications();
                    metrics
                        .report_latency
                        .observe(started.elapsed().as_secs_f64());
                }
            }
            Ok(Outcome::Suppressed) => {
                self.stats.suppressed += 1;
                if let Some(metrics) = &self.metrics {
                    metrics.inc_suppressed();
                }
            }
            Err(err) => {
                self.stats.failed += 1;
                warn!(path = %item.path().display(), "Notification failed: {err}");
                if let Some(metrics) = &self.metrics {
                    metrics.inc_failures();
                }
                // Nobody listening is fine; the failure is already logged.
                let _ = self.errors.send(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{fixtures, quiet_registry, Recorder};
    use buildnotify_core::options::NotifyOptions;
    use buildnotify_core::registry::LogLevel;
    use buildnotify_core::reporter::{CallbackReporter, Done, Reporter};

    async fn run_all(
        transform: NotifyTransform,
        items: Vec<Arc<Artifact>>,
    ) -> (Vec<Arc<Artifact>>, TransformStats) {
        let (tx, rx) = mpsc::channel(items.len().max(1));
        for item in items {
            tx.send(item).await.unwrap();
        }
        drop(tx);

        let (mut out, handle) = transform.spawn(rx, 8);
        let mut forwarded = Vec::new();
        while let Some(item) = out.recv().await {
            forwarded.push(item);
        }
        (forwarded, handle.await.unwrap().unwrap())
    }

    fn drain(errors: &mut ErrorChannel) -> Vec<NotifyError> {
        let mut out = Vec::new();
        while let Ok(err) = errors.try_recv() {
            out.push(err);
        }
        out
    }

    #[tokio::test]
    async fn notifies_every_item_by_default() {
        let (registry, _) = quiet_registry();
        let recorder = Arc::new(Recorder::default());
        let (transform, mut errors) =
            NotifyTransform::new(NotifyOptions::new().notifier(recorder.clone()));

        let items = fixtures(&["1.txt", "2.txt", "3.txt"]);
        let (forwarded, stats) = run_all(transform.with_registry(registry), items.clone()).await;

        assert_eq!(recorder.calls(), 3);
        assert_eq!(
            recorder.messages(),
            [
                "/work/test/fixtures/1.txt",
                "/work/test/fixtures/2.txt",
                "/work/test/fixtures/3.txt"
            ]
        );
        assert_eq!(forwarded.len(), 3);
        assert!(forwarded.iter().zip(&items).all(|(a, b)| Arc::ptr_eq(a, b)));
        assert_eq!(stats.notified, 3);
        assert!(drain(&mut errors).is_empty());
    }

    #[tokio::test]
    async fn on_last_notifies_once_with_last_item() {
        let (registry, _) = quiet_registry();
        let recorder = Arc::new(Recorder::default());
        let (transform, _errors) = NotifyTransform::new(
            NotifyOptions::new()
                .on_last(true)
                .notifier(recorder.clone()),
        );

        let items = fixtures(&["1.txt", "2.txt", "3.txt"]);
        let (forwarded, stats) = run_all(transform.with_registry(registry), items).await;

        assert_eq!(forwarded.len(), 3);
        assert_eq!(recorder.messages(), ["/work/test/fixtures/3.txt"]);
        assert_eq!(stats.received, 3);
        assert_eq!(stats.notified, 1);
    }

    #[tokio::test]
    async fn on_last_with_empty_stream_never_reports() {
        let (registry, _) = quiet_registry();
        let recorder = Arc::new(Recorder::default());
        let (transform, _errors) = NotifyTransform::new(
            NotifyOptions::new()
                .on_last(true)
                .notifier(recorder.clone()),
        );

        let (forwarded, stats) = run_all(transform.with_registry(registry), Vec::new()).await;
        assert!(forwarded.is_empty());
        assert_eq!(recorder.calls(), 0);
        assert_eq!(stats, TransformStats::default());
    }

    #[tokio::test]
    async fn on_last_forwards_before_end_of_stream() {
        let (registry, _) = quiet_registry();
        let recorder = Arc::new(Recorder::default());
        let (transform, _errors) = NotifyTransform::new(
            NotifyOptions::new()
                .on_last(true)
                .notifier(recorder.clone()),
        );
        let mut transform = transform.with_registry(registry);

        for item in fixtures(&["a.js", "b.js"]) {
            let forwarded = transform.push(item.clone()).await;
            assert!(Arc::ptr_eq(&forwarded, &item));
        }
        assert_eq!(recorder.calls(), 0);

        transform.finish().await;
        assert_eq!(recorder.messages(), ["/work/test/fixtures/b.js"]);

        // The slot is cleared once reported.
        transform.finish().await;
        assert_eq!(recorder.calls(), 1);
    }

    #[tokio::test]
    async fn failures_go_to_error_channel_and_items_still_flow() {
        let (registry, _) = quiet_registry();
        let recorder = Arc::new(Recorder::failing("notifier offline"));
        let (transform, mut errors) =
            NotifyTransform::new(NotifyOptions::new().notifier(recorder.clone()));

        let (forwarded, stats) = run_all(
            transform.with_registry(registry),
            fixtures(&["1.txt", "2.txt"]),
        )
        .await;

        assert_eq!(forwarded.len(), 2);
        assert_eq!(recorder.calls(), 2);
        assert_eq!(stats.failed, 2);

        let errors = drain(&mut errors);
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| e.to_string() == "buildnotify: notifier offline"));
    }

    #[tokio::test]
    async fn thrown_and_called_back_errors_behave_alike() {
        let thrower = CallbackReporter::shared(|_, _done: Done| Err("test error".into()));
        let caller = CallbackReporter::shared(|_, done: Done| {
            done.fail("test error");
            Ok(())
        });

        let mut seen = Vec::new();
        for reporter in [thrower, caller] {
            let (registry, _) = quiet_registry();
            let (transform, mut errors) = NotifyTransform::new(NotifyOptions::new().notifier(reporter));
            let (forwarded, _) =
                run_all(transform.with_registry(registry), fixtures(&["1.txt"])).await;
            let errors = drain(&mut errors);
            assert_eq!(errors.len(), 1);
            seen.push((forwarded.len(), errors[0].cause_message()));
        }

        assert_eq!(seen[0], (1, "test error".to_string()));
        assert_eq!(seen[0], seen[1]);
    }

    #[tokio::test]
    async fn on_last_failure_is_reported_once_and_stream_completes() {
        let (registry, _) = quiet_registry();
        let recorder = Arc::new(Recorder::failing("nope"));
        let (transform, mut errors) = NotifyTransform::new(
            NotifyOptions::new()
                .on_last(true)
                .notifier(recorder.clone()),
        );

        let (forwarded, stats) = run_all(
            transform.with_registry(registry),
            fixtures(&["1.txt", "2.txt"]),
        )
        .await;
        assert_eq!(forwarded.len(), 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(drain(&mut errors).len(), 1);
    }

    #[tokio::test]
    async fn falls_back_to_registry_default_reporter() {
        let (registry, _) = quiet_registry();
        let recorder = Arc::new(Recorder::default());
        registry.set_default_reporter(recorder.clone());

        let (transform, _errors) = NotifyTransform::new("this is a test");
        run_all(transform.with_registry(registry), fixtures(&["1.txt"])).await;
        assert_eq!(recorder.messages(), ["this is a test"]);
    }

    #[tokio::test]
    async fn missing_reporter_is_a_channel_error() {
        let (registry, _) = quiet_registry();
        let (transform, mut errors) = NotifyTransform::new(NotifyConfig::Default);
        let (forwarded, _) =
            run_all(transform.with_registry(registry), fixtures(&["1.txt"])).await;

        assert_eq!(forwarded.len(), 1);
        assert!(matches!(
            drain(&mut errors).as_slice(),
            [NotifyError::NoReporterConfigured]
        ));
    }

    #[tokio::test]
    async fn template_errors_do_not_crash_the_stream() {
        let (registry, _) = quiet_registry();
        let recorder = Arc::new(Recorder::default());
        let (transform, mut errors) = NotifyTransform::new(
            NotifyOptions::new()
                .message("<%= file.nope %>")
                .notifier(recorder.clone()),
        );

        let (forwarded, _) = run_all(
            transform.with_registry(registry),
            fixtures(&["1.txt", "2.txt"]),
        )
        .await;
        assert_eq!(forwarded.len(), 2);
        assert_eq!(recorder.calls(), 0);
        assert!(drain(&mut errors)
            .iter()
            .all(|e| matches!(e, NotifyError::Template(_))));
    }

    #[tokio::test]
    async fn template_message_uses_relative_path() {
        let (registry, _) = quiet_registry();
        let recorder = Arc::new(Recorder::default());
        let (transform, _errors) = NotifyTransform::new(
            NotifyOptions::new()
                .message("Template: <%= file.relative %>")
                .notifier(recorder.clone()),
        );

        run_all(transform.with_registry(registry), fixtures(&["1.txt"])).await;
        assert_eq!(recorder.messages(), ["Template: 1.txt"]);
    }

    #[tokio::test]
    async fn log_level_changes_apply_to_running_transform() {
        let (registry, lines) = quiet_registry();
        let recorder: Arc<dyn Reporter> = Arc::new(Recorder::default());
        let (transform, _errors) = NotifyTransform::new(NotifyOptions::new().notifier(recorder));
        let mut transform = transform.with_registry(registry.clone());

        let items = fixtures(&["1.txt", "2.txt", "3.txt"]);
        transform.push(items[0].clone()).await;
        registry.set_log_level(LogLevel::Silent);
        transform.push(items[1].clone()).await;
        registry.set_log_level(LogLevel::ErrorsOnly);
        transform.push(items[2].clone()).await;

        assert_eq!(
            lines.lock().as_slice(),
            ["[Build notification] /work/test/fixtures/1.txt"]
        );
    }

    #[tokio::test]
    async fn metrics_track_outcomes() {
        let (registry, _) = quiet_registry();
        let metrics = Arc::new(MetricsRecorder::new().unwrap());
        let recorder = Arc::new(Recorder::default());
        let (transform, _errors) = NotifyTransform::new(
            NotifyOptions::new()
                .message_with(|subject| match subject.artifact() {
                    Some(file) if file.basename() == "skip.txt" => String::new(),
                    _ => "built".to_string(),
                })
                .notifier(recorder),
        );

        let (_, stats) = run_all(
            transform.with_registry(registry).with_metrics(metrics.clone()),
            fixtures(&["1.txt", "skip.txt"]),
        )
        .await;

        assert_eq!(stats.notified, 1);
        assert_eq!(stats.suppressed, 1);
        assert_eq!(metrics.notifications.get() as u64, 1);
        assert_eq!(metrics.suppressed.get() as u64, 1);
    }

    #[tokio::test]
    async fn closed_downstream_is_reported() {
        let (registry, _) = quiet_registry();
        let recorder = Arc::new(Recorder::default());
        let (transform, _errors) = NotifyTransform::new(NotifyOptions::new().notifier(recorder));

        let (tx, rx) = mpsc::channel(4);
        let (out_tx, out_rx) = mpsc::channel(4);
        drop(out_rx);
        for item in fixtures(&["1.txt"]) {
            tx.send(item).await.unwrap();
        }
        drop(tx);

        let result = transform.with_registry(registry).run(rx, out_tx).await;
        assert!(matches!(result, Err(EngineError::DownstreamClosed)));
    }
}

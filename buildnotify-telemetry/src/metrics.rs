//! ## buildnotify-telemetry::metrics
//! **Prometheus counters for notification outcomes**

use prometheus::{Counter, Histogram, HistogramOpts, Registry};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: prometheus::Registry,
    pub notifications: prometheus::Counter,
    pub failures: prometheus::Counter,
    pub suppressed: prometheus::Counter,
    pub report_latency: prometheus::Histogram,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let notifications = Counter::new(
            "buildnotify_notifications_total",
            "Notifications handed to a reporter",
        )?;
        let failures = Counter::new(
            "buildnotify_notification_failures_total",
            "Notifications that ended in a reporter, template or configuration failure",
        )?;
        let suppressed = Counter::new(
            "buildnotify_notifications_suppressed_total",
            "Notifications skipped because the resolved message was empty",
        )?;
        let report_latency = Histogram::with_opts(
            HistogramOpts::new(
                "buildnotify_report_latency_seconds",
                "Time spent waiting on the reporter",
            )
            .buckets(vec![0.001, 0.01, 0.1, 1.0, 10.0]),
        )?;

        registry.register(Box::new(notifications.clone()))?;
        registry.register(Box::new(failures.clone()))?;
        registry.register(Box::new(suppressed.clone()))?;
        registry.register(Box::new(report_latency.clone()))?;

        Ok(Self {
            registry,
            notifications,
            failures,
            suppressed,
            report_latency,
        })
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn inc_notifications(&self) {
        self.notifications.inc();
    }

    pub fn inc_failures(&self) {
        self.failures.inc();
    }

    pub fn inc_suppressed(&self) {
        self.suppressed.inc();
    }
}

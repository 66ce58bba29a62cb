use std::sync::Arc;

use async_trait::async_trait;
use buildnotify_core::prelude::*;
use parking_lot::Mutex;

/// Reporter that records every notification and optionally fails.
#[derive(Default)]
pub(crate) struct Recorder {
    pub seen: Mutex<Vec<Notification>>,
    pub fail_with: Option<&'static str>,
}

impl Recorder {
    pub fn failing(message: &'static str) -> Self {
        Self {
            seen: Mutex::default(),
            fail_with: Some(message),
        }
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn messages(&self) -> Vec<String> {
        self.seen.lock().iter().map(|n| n.message.clone()).collect()
    }
}

#[async_trait]
impl Reporter for Recorder {
    async fn report(&self, notification: &Notification) -> Result<(), ReporterError> {
        self.seen.lock().push(notification.clone());
        match self.fail_with {
            Some(message) => Err(ReporterError::failed(message)),
            None => Ok(()),
        }
    }
}

/// Registry isolated from the process-wide one, with a counting sink.
pub(crate) fn quiet_registry() -> (Arc<Registry>, Arc<Mutex<Vec<String>>>) {
    let registry = Arc::new(Registry::new());
    let lines = Arc::new(Mutex::new(Vec::new()));
    let captured = lines.clone();
    registry.set_logger(Arc::new(move |_: &str, title: &str, message: &str| {
        captured.lock().push(format!("[{title}] {message}"));
    }));
    registry.clear_default_reporter();
    (registry, lines)
}

pub(crate) fn fixtures(names: &[&str]) -> Vec<Arc<Artifact>> {
    names
        .iter()
        .map(|name| {
            Arc::new(
                Artifact::new(format!("/work/test/fixtures/{name}"), "/work/test/fixtures")
                    .with_contents(name.as_bytes().to_vec()),
            )
        })
        .collect()
}

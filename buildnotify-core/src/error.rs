use thiserror::Error;

/// Tag prefixed to every failure surfaced by this crate and passed to log sinks.
pub const PLUGIN_NAME: &str = "buildnotify";

/// Boxed error type accepted from reporters and upstream producers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Template interpolation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template references undefined path `{0}`")]
    UndefinedPath(String),

    #[error("invalid template expression `{0}`")]
    InvalidExpression(String),
}

/// Failure reported by (or raised inside) a reporting capability.
#[derive(Debug, Error)]
pub enum ReporterError {
    /// The reporter returned or called back with an error.
    #[error("{0}")]
    Failed(#[source] BoxError),

    /// The reporter panicked while handling the notification.
    #[error("reporter panicked: {0}")]
    Panicked(String),

    /// The completion handle was dropped without being resolved.
    #[error("reporter dropped its completion handle without responding")]
    Abandoned,
}

impl ReporterError {
    pub fn failed<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        ReporterError::Failed(err.into())
    }
}

/// The single failure value that leaves the reporter invoker.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("buildnotify: no reporter configured")]
    NoReporterConfigured,

    #[error("buildnotify: {0}")]
    Reporter(#[from] ReporterError),

    #[error("buildnotify: {0}")]
    Template(#[from] TemplateError),
}

impl NotifyError {
    /// Message of the innermost cause, without the plugin tag.
    pub fn cause_message(&self) -> String {
        match self {
            NotifyError::NoReporterConfigured => "no reporter configured".to_string(),
            NotifyError::Reporter(err) => err.to_string(),
            NotifyError::Template(err) => err.to_string(),
        }
    }
}

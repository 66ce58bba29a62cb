//! Caller configuration for a notify transform or error notifier.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::item::Subject;
use crate::reporter::Reporter;

/// Per-item text computation.
pub type TextFn = Arc<dyn Fn(Subject<'_>) -> String + Send + Sync>;

/// Where a title or message comes from.
#[derive(Clone)]
pub enum TextSource {
    Static(String),
    Computed(TextFn),
}

impl TextSource {
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(Subject<'_>) -> String + Send + Sync + 'static,
    {
        TextSource::Computed(Arc::new(f))
    }

    pub fn evaluate(&self, subject: Subject<'_>) -> String {
        match self {
            TextSource::Static(text) => text.clone(),
            TextSource::Computed(f) => f(subject),
        }
    }
}

impl fmt::Debug for TextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextSource::Static(text) => f.debug_tuple("Static").field(text).finish(),
            TextSource::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<&str> for TextSource {
    fn from(text: &str) -> Self {
        TextSource::Static(text.to_string())
    }
}

impl From<String> for TextSource {
    fn from(text: String) -> Self {
        TextSource::Static(text)
    }
}

/// Structured configuration record.
#[derive(Clone, Default)]
pub struct NotifyOptions {
    pub title: Option<TextSource>,
    pub message: Option<TextSource>,
    /// Notify once at end-of-stream using the last item instead of once per item.
    pub on_last: bool,
    /// Extra variables visible to templates under `options.*`.
    pub template_options: Map<String, Value>,
    /// Reporter used instead of the registry default.
    pub notifier: Option<Arc<dyn Reporter>>,
}

impl NotifyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<TextSource>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn title_with<F>(self, f: F) -> Self
    where
        F: Fn(Subject<'_>) -> String + Send + Sync + 'static,
    {
        self.title(TextSource::computed(f))
    }

    pub fn message(mut self, message: impl Into<TextSource>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn message_with<F>(self, f: F) -> Self
    where
        F: Fn(Subject<'_>) -> String + Send + Sync + 'static,
    {
        self.message(TextSource::computed(f))
    }

    pub fn on_last(mut self, on_last: bool) -> Self {
        self.on_last = on_last;
        self
    }

    pub fn template_option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.template_options.insert(name.into(), value.into());
        self
    }

    pub fn notifier(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.notifier = Some(reporter);
        self
    }
}

impl fmt::Debug for NotifyOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifyOptions")
            .field("title", &self.title)
            .field("message", &self.message)
            .field("on_last", &self.on_last)
            .field("template_options", &self.template_options)
            .field("notifier", &self.notifier.as_ref().map(|_| ".."))
            .finish()
    }
}

/// The accepted configuration shapes.
#[derive(Clone, Debug, Default)]
pub enum NotifyConfig {
    /// Defaults only.
    #[default]
    Default,
    /// Message text used verbatim for artifacts.
    Message(String),
    /// Message computed per item.
    Computed(TextSource),
    Options(NotifyOptions),
}

impl NotifyConfig {
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(Subject<'_>) -> String + Send + Sync + 'static,
    {
        NotifyConfig::Computed(TextSource::computed(f))
    }

    pub fn on_last(&self) -> bool {
        matches!(self, NotifyConfig::Options(opts) if opts.on_last)
    }

    pub fn template_options(&self) -> Option<&Map<String, Value>> {
        match self {
            NotifyConfig::Options(opts) => Some(&opts.template_options),
            _ => None,
        }
    }

    pub fn notifier(&self) -> Option<&Arc<dyn Reporter>> {
        match self {
            NotifyConfig::Options(opts) => opts.notifier.as_ref(),
            _ => None,
        }
    }

    /// Forces `reporter` regardless of what the caller configured, keeping the other fields.
    pub fn with_notifier(self, reporter: Arc<dyn Reporter>) -> Self {
        let opts = match self {
            NotifyConfig::Default => NotifyOptions::new(),
            NotifyConfig::Message(message) => NotifyOptions::new().message(message),
            NotifyConfig::Computed(source) => NotifyOptions::new().message(source),
            NotifyConfig::Options(opts) => opts,
        };
        NotifyConfig::Options(opts.notifier(reporter))
    }
}

impl From<&str> for NotifyConfig {
    fn from(message: &str) -> Self {
        NotifyConfig::Message(message.to_string())
    }
}

impl From<String> for NotifyConfig {
    fn from(message: String) -> Self {
        NotifyConfig::Message(message)
    }
}

impl From<NotifyOptions> for NotifyConfig {
    fn from(opts: NotifyOptions) -> Self {
        NotifyConfig::Options(opts)
    }
}

impl From<Option<NotifyOptions>> for NotifyConfig {
    fn from(opts: Option<NotifyOptions>) -> Self {
        opts.map_or(NotifyConfig::Default, NotifyConfig::Options)
    }
}

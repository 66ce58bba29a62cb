//! Turns a [`NotifyConfig`] plus the current item into a concrete [`Notification`].
//!
//! Precedence, lowest to highest: built-in defaults, string shorthand
//! (artifacts only), computed shorthand, structured record fields. Text that
//! contains `<%=` is then rendered against `{file|error, options}`.

use serde_json::Map;

use crate::error::TemplateError;
use crate::item::Subject;
use crate::notification::Notification;
use crate::options::NotifyConfig;
use crate::template::{self, contains_template};

pub const DEFAULT_TITLE: &str = "Build notification";
pub const DEFAULT_ERROR_TITLE: &str = "Error running build";

pub fn default_title(subject: Subject<'_>) -> &'static str {
    if subject.is_error() {
        DEFAULT_ERROR_TITLE
    } else {
        DEFAULT_TITLE
    }
}

/// Resolves the notification for `subject`.
///
/// Returns `Ok(None)` when the message resolves to an empty string, which
/// suppresses the notification for that item. An empty title falls back to
/// the default for the subject kind.
pub fn resolve(
    config: &NotifyConfig,
    subject: Subject<'_>,
) -> Result<Option<Notification>, TemplateError> {
    let mut title = default_title(subject).to_string();
    let mut message = match subject {
        Subject::Artifact(file) => file.path().to_string_lossy().into_owned(),
        Subject::Error(err) => err.message().to_string(),
    };

    match config {
        NotifyConfig::Default => {}
        NotifyConfig::Message(text) => {
            if !subject.is_error() {
                message = text.clone();
            }
        }
        NotifyConfig::Computed(source) => message = source.evaluate(subject),
        NotifyConfig::Options(opts) => {
            if let Some(source) = &opts.title {
                title = source.evaluate(subject);
            }
            if let Some(source) = &opts.message {
                message = source.evaluate(subject);
            }
        }
    }

    let no_options = Map::new();
    let template_options = config.template_options().unwrap_or(&no_options);
    let mut context = None;
    let mut interpolate = |text: String| -> Result<String, TemplateError> {
        if !contains_template(&text) {
            return Ok(text);
        }
        let context =
            context.get_or_insert_with(|| template::subject_context(subject, template_options));
        template::render(&text, context)
    };

    let title = interpolate(title)?;
    let message = interpolate(message)?;

    if message.is_empty() {
        return Ok(None);
    }

    Ok(Some(Notification {
        title: if title.is_empty() {
            default_title(subject).to_string()
        } else {
            title
        },
        message,
    }))
}

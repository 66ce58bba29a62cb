//! Static notification defaults read from configuration files.
//!
//! Only static text can live in a file; computed titles and messages are
//! supplied in code.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{self, Validate};

use crate::validation;

#[derive(Default, Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct NotifySettings {
    /// Title text or template.
    #[serde(default)]
    #[validate(custom(function = validation::validate_template))]
    pub title: Option<String>,

    /// Message text or template.
    #[serde(default)]
    #[validate(custom(function = validation::validate_template))]
    pub message: Option<String>,

    /// Notify once, on the last item, instead of once per item.
    #[serde(default)]
    pub on_last: bool,

    /// Extra variables exposed to templates as `options.*`.
    #[serde(default)]
    pub template_options: Map<String, Value>,

    /// Text used for upstream build errors. `title` and `message` above only
    /// apply to artifacts, since they may reference `file.*`.
    #[validate(nested)]
    #[serde(default)]
    pub on_error: ErrorNotifySettings,
}

/// Static title and message for error notifications; templates see `error.*`.
#[derive(Default, Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct ErrorNotifySettings {
    #[serde(default)]
    #[validate(custom(function = validation::validate_template))]
    pub title: Option<String>,

    #[serde(default)]
    #[validate(custom(function = validation::validate_template))]
    pub message: Option<String>,
}

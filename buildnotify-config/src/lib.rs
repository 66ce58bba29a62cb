//! # buildnotify Configuration
//!
//! Layered settings for notify transforms and their telemetry.
//!
//! Hierarchy, later layers win:
//! 1. Default values
//! 2. `config/buildnotify.yaml`
//! 3. `config/<BUILDNOTIFY_ENV>.yaml`
//! 4. `BUILDNOTIFY_*` environment variables (`__` separates nesting)

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod error;
mod notify;
mod telemetry;
mod validation;

pub use error::ConfigError;
pub use notify::{ErrorNotifySettings, NotifySettings};
pub use telemetry::{LoggingConfig, MetricsConfig, TelemetryConfig};

pub const BASE_FILE: &str = "config/buildnotify.yaml";
pub const ENV_PREFIX: &str = "BUILDNOTIFY_";

/// Top-level settings container.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone, PartialEq)]
pub struct Settings {
    /// Defaults applied to every transform built from these settings.
    #[validate(nested)]
    #[serde(default)]
    pub notify: NotifySettings,

    /// Logging and metrics.
    #[validate(nested)]
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl Settings {
    /// Load settings from the default files and environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));

        if Path::new(BASE_FILE).exists() {
            figment = figment.merge(Yaml::file(BASE_FILE));
        }

        if let Ok(env) = std::env::var("BUILDNOTIFY_ENV") {
            let env_file = format!("config/{env}.yaml");
            if Path::new(&env_file).exists() {
                figment = figment.merge(Yaml::file(env_file));
            }
        }

        Self::extract(figment.merge(Env::prefixed(ENV_PREFIX).ignore(&["ENV"]).split("__")))
    }

    /// Load settings from an explicit file, still honouring environment overrides.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        Self::extract(
            Figment::from(Serialized::defaults(Settings::default()))
                .merge(Yaml::file(path))
                .merge(Env::prefixed(ENV_PREFIX).ignore(&["ENV"]).split("__")),
        )
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let settings: Self = figment.extract()?;
        settings.validate()?;
        Ok(settings)
    }
}

//! Logging and metrics configuration.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

/// Logging configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Which notifications reach the log sink (0 silent, 1 errors only, 2 all).
    #[serde(default = "default_level")]
    #[validate(range(max = 2))]
    pub level: u8,

    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    #[validate(length(min = 1))]
    pub filter: String,
}

fn default_level() -> u8 {
    2
}

fn default_filter() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            filter: default_filter(),
        }
    }
}

#[derive(Default, Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct MetricsConfig {
    /// Print gathered metrics when a run finishes.
    #[serde(default)]
    pub enabled: bool,
}

/// Telemetry configuration.
#[derive(Default, Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct TelemetryConfig {
    #[validate(nested)]
    #[serde(default)]
    pub logging: LoggingConfig,

    #[validate(nested)]
    #[serde(default)]
    pub metrics: MetricsConfig,
}

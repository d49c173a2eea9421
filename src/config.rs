//! Layered configuration.
//!
//! Settings are resolved from, in increasing priority:
//!
//! 1. built-in defaults
//! 2. an optional TOML file (`--config`)
//! 3. environment variables prefixed with `PREVENIX_`, using `__` between
//!    sections (e.g. `PREVENIX_API__BASE_URL`, `PREVENIX_THRESHOLDS__VIBRATION`)
//! 4. command-line flags, applied by the binary
//!
//! ```toml
//! [api]
//! base_url = "https://sensors.example.com"
//! timeout_ms = 5000
//!
//! [push]
//! url = "http://localhost:4000"
//! framing = "socketio"
//!
//! [thresholds]
//! temperature = 50
//! vibration = 30
//! ```

use std::path::Path;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::dashboard::DashboardOptions;
use crate::data::{Thresholds, SERIES_CAPACITY};
use crate::source::Framing;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "PREVENIX";

/// Complete dashboard configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub push: PushSettings,
    pub thresholds: Thresholds,
    pub series: SeriesSettings,
}

/// Bulk-read service endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL; endpoint paths are resolved below it.
    pub base_url: String,
    pub alerts_path: String,
    pub records_path: String,
    /// Per-request timeout.
    pub timeout_ms: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://your-aws-api-endpoint.com".to_string(),
            alerts_path: "alerts".to_string(),
            records_path: "records".to_string(),
            timeout_ms: 5000,
        }
    }
}

/// Push channel endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushSettings {
    pub url: String,
    pub framing: Framing,
}

impl Default for PushSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:4000".to_string(),
            framing: Framing::SocketIo,
        }
    }
}

/// Chart window settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesSettings {
    /// Points kept per series.
    pub capacity: usize,
    /// Seed both series with placeholder points.
    pub placeholder: bool,
}

impl Default for SeriesSettings {
    fn default() -> Self {
        Self {
            capacity: SERIES_CAPACITY,
            placeholder: true,
        }
    }
}

impl Settings {
    /// Load settings from defaults, an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Options for the dashboard controller.
    pub fn dashboard_options(&self) -> DashboardOptions {
        DashboardOptions {
            thresholds: self.thresholds,
            series_capacity: self.series.capacity,
            placeholder_series: self.series.placeholder,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.thresholds.temperature, 50.0);
        assert_eq!(settings.thresholds.vibration, 30.0);
        assert_eq!(settings.series.capacity, 10);
        assert!(settings.series.placeholder);
        assert_eq!(settings.push.framing, Framing::SocketIo);
    }

    #[test]
    fn test_load_without_file_gives_defaults() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.api.alerts_path, "alerts");
        assert_eq!(settings.series, SeriesSettings::default());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[api]
base_url = "http://localhost:8080/api"

[push]
framing = "json"

[thresholds]
vibration = 12.5

[series]
placeholder = false
"#
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.api.base_url, "http://localhost:8080/api");
        assert_eq!(settings.api.records_path, "records");
        assert_eq!(settings.push.framing, Framing::Json);
        assert_eq!(settings.push.url, "http://localhost:4000");
        assert_eq!(settings.thresholds.vibration, 12.5);
        assert_eq!(settings.thresholds.temperature, 50.0);
        assert!(!settings.series.placeholder);

        let options = settings.dashboard_options();
        assert!(!options.placeholder_series);
        assert_eq!(options.series_capacity, 10);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(Settings::load(Some(Path::new("/nonexistent/prevenix.toml"))).is_err());
    }
}

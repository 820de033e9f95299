//! Layered runtime configuration.
//!
//! Values are resolved from, lowest precedence first: built-in defaults, an
//! optional TOML file, and `OILWATCH_*` environment variables. Command-line
//! flags are applied on top by the binary.
//!
//! ```toml
//! api_url = "https://maintenance.example.com"
//! unit = "l-per-1000km"
//! request_timeout_secs = 15
//! log_file = "/tmp/oilwatch.log"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::ConsumptionUnit;

/// Environment variable prefix, e.g. `OILWATCH_API_URL`.
pub const ENV_PREFIX: &str = "OILWATCH";

/// Resolved settings for a dashboard session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// Base URL of the maintenance log API, without the `/api/oils` path.
    #[serde(default)]
    pub api_url: Option<String>,
    /// Unit for per-record consumption figures.
    #[serde(default)]
    pub unit: ConsumptionUnit,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Where interactive sessions write their log.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_log_file() -> PathBuf {
    PathBuf::from("oilwatch.log")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: None,
            unit: ConsumptionUnit::default(),
            request_timeout_secs: default_timeout_secs(),
            log_file: default_log_file(),
        }
    }
}

impl Settings {
    /// Load settings from an optional file and the process environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(config_path, None)
    }

    /// Like [`Settings::load`], but reads environment variables from `env`
    /// instead of the process when given.
    pub fn load_with_env(
        config_path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        }

        let config = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true).source(env))
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings.normalized())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    fn normalized(mut self) -> Self {
        self.api_url = self
            .api_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        self
    }
}

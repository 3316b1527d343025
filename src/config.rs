//! Configuration management module
//!
//! Layers, lowest first: built-in defaults, the YAML config file
//! (`$CONFIG_DIR/pagetag/config.yaml` unless a path is given) and
//! `PAGETAG__SECTION__KEY` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use action_primitives::Pacing;
use cdp_adapter::CdpConfig;
use config::{Config, ConfigError, Environment, File};
use perceiver_structural::TaggingOptions;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const ENV_PREFIX: &str = "PAGETAG";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PagetagConfig {
    pub cdp: CdpConfig,
    pub tagging: TaggingOptions,
    pub timeouts: TimeoutConfig,
    pub pacing: PacingConfig,
    pub logging: LoggingConfig,
}

/// Upper bounds for the calls that must never hang the caller
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub screenshot_ms: u64,
    pub page_details_ms: u64,
    pub navigation_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            screenshot_ms: 5_000,
            page_details_ms: 5_000,
            navigation_ms: 3_000,
        }
    }
}

impl TimeoutConfig {
    pub fn screenshot(&self) -> Duration {
        Duration::from_millis(self.screenshot_ms)
    }

    pub fn page_details(&self) -> Duration {
        Duration::from_millis(self.page_details_ms)
    }

    pub fn navigation(&self) -> Duration {
        Duration::from_millis(self.navigation_ms)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Pause after the pointer moves onto the target
    pub pointer_settle_ms: u64,
    /// Pause between mouse-down and mouse-up
    pub press_release_ms: u64,
    pub hover_settle_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            pointer_settle_ms: 300,
            press_release_ms: 100,
            hover_settle_ms: 300,
        }
    }
}

impl From<PacingConfig> for Pacing {
    fn from(cfg: PacingConfig) -> Self {
        Pacing {
            pointer_settle: Duration::from_millis(cfg.pointer_settle_ms),
            press_release: Duration::from_millis(cfg.press_release_ms),
            hover_settle: Duration::from_millis(cfg.hover_settle_ms),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    pub json: bool,
    /// Daily-rolling log files are written here when set
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            directory: None,
        }
    }
}

/// `$CONFIG_DIR/pagetag/config.yaml`, when the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pagetag").join("config.yaml"))
}

impl PagetagConfig {
    /// Loads the layered configuration. An explicit `path` must exist; the default
    /// location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&PagetagConfig::default())?);

        match path {
            Some(path) => {
                info!(path = %path.display(), "Loading configuration");
                builder = builder.add_source(File::from(path).required(true));
            }
            None => {
                if let Some(default_path) = default_config_path() {
                    debug!(path = %default_path.display(), "Looking for configuration");
                    builder = builder.add_source(File::from(default_path).required(false));
                }
            }
        }

        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

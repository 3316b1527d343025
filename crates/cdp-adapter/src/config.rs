use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AdapterError;

/// Names a browser binary explicitly, ahead of the `PATH` search.
pub const CHROME_ENV: &str = "PAGETAG_CHROME";

#[cfg(target_os = "windows")]
const CHROME_NAMES: &[&str] = &["chrome.exe", "chromium.exe", "msedge.exe"];
#[cfg(not(target_os = "windows"))]
const CHROME_NAMES: &[&str] = &[
    "google-chrome-stable",
    "google-chrome",
    "chromium",
    "chromium-browser",
];

/// How to reach a browser: attach to `websocket_url`, or launch one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CdpConfig {
    pub websocket_url: Option<String>,
    /// Found through `PAGETAG_CHROME` and then `PATH` when unset.
    pub executable: Option<PathBuf>,
    /// chromiumoxide picks a throwaway profile when unset.
    pub user_data_dir: Option<PathBuf>,
    pub headless: bool,
    /// Upper bound on one command round trip
    pub command_timeout_ms: u64,
    /// Appended to the launch command line
    pub extra_args: Vec<String>,
}

impl Default for CdpConfig {
    fn default() -> Self {
        Self {
            websocket_url: None,
            executable: None,
            user_data_dir: None,
            headless: true,
            command_timeout_ms: 30_000,
            extra_args: Vec::new(),
        }
    }
}

impl CdpConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    /// The binary to launch. An explicit path must exist.
    pub fn resolve_executable(&self) -> Result<PathBuf, AdapterError> {
        if let Some(path) = &self.executable {
            if path.exists() {
                return Ok(path.clone());
            }
            return Err(AdapterError::Launch(format!(
                "{} does not exist",
                path.display()
            )));
        }

        if let Some(path) = env::var_os(CHROME_ENV)
            .map(PathBuf::from)
            .filter(|path| !path.as_os_str().is_empty() && path.exists())
        {
            return Ok(path);
        }

        CHROME_NAMES
            .iter()
            .find_map(|name| which::which(name).ok())
            .ok_or_else(|| {
                AdapterError::Launch(format!(
                    "no Chrome or Chromium on PATH; set {CHROME_ENV} or cdp.executable"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    #[serial]
    fn environment_names_the_browser() {
        let dir = tempdir().unwrap();
        let exe = dir.path().join("my-chrome");
        fs::write(&exe, b"").unwrap();

        let previous = env::var_os(CHROME_ENV);
        env::set_var(CHROME_ENV, &exe);
        let resolved = CdpConfig::default().resolve_executable();
        match previous {
            Some(value) => env::set_var(CHROME_ENV, value),
            None => env::remove_var(CHROME_ENV),
        }

        assert_eq!(resolved.unwrap(), exe);
    }

    #[test]
    fn explicit_executable_must_exist() {
        let cfg = CdpConfig {
            executable: Some(PathBuf::from("/nonexistent/pagetag/chrome")),
            ..CdpConfig::default()
        };
        let err = cfg.resolve_executable().unwrap_err();
        assert!(matches!(err, AdapterError::Launch(ref msg) if msg.contains("does not exist")));
    }

    #[test]
    fn defaults_launch_headless() {
        let cfg = CdpConfig::default();
        assert!(cfg.headless);
        assert!(cfg.websocket_url.is_none());
        assert_eq!(cfg.command_timeout(), Duration::from_secs(30));
    }
}

//! Harness settings file handling
//!
//! Settings tune the timing behavior of the harness itself, not the tool
//! under test. Everything defaults sensibly when no file is present.

use serde::Deserialize;

use super::paths::settings_path;
use super::Result;

/// Harness-wide settings loaded from `config.toml`
#[derive(Debug, Deserialize, Default)]
pub struct Settings {
    /// Timing knobs
    #[serde(default)]
    pub timeouts: Timeouts,
}

/// Timeout settings in seconds unless noted
#[derive(Debug, Deserialize)]
pub struct Timeouts {
    /// Margin added to the calibration run's elapsed time when a step
    /// requests a baseline-derived deadline
    #[serde(default = "default_margin")]
    pub margin_secs: u64,

    /// Grace period between the termination signal and the forced reap
    #[serde(default = "default_kill_grace")]
    pub kill_grace_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            margin_secs: default_margin(),
            kill_grace_ms: default_kill_grace(),
        }
    }
}

fn default_margin() -> u64 {
    3
}
fn default_kill_grace() -> u64 {
    500
}

impl Settings {
    /// Load settings from the default settings file
    ///
    /// Returns default settings if the file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = settings_path() {
            if path.exists() {
                let content = std::fs::read_to_string(&path)?;
                return toml::from_str(&content)
                    .map_err(|e| super::Error::SettingsParse(e.to_string()));
            }
        }
        Ok(Self::default())
    }
}

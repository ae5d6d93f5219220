//! Configuration and scratch paths
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/proctor/`
//! - macOS: `~/Library/Application Support/proctor/`
//! - Windows: `%APPDATA%\proctor\`

use std::io;
use std::path::PathBuf;

const APP_NAME: &str = "proctor";

/// Get the harness configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the harness settings file
pub fn settings_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Scratch directory for a named scenario, under the system temp dir
///
/// The directory is created if missing. Each scenario gets its own
/// directory so config files are never shared between scenarios.
pub fn scenario_dir(name: &str) -> io::Result<PathBuf> {
    let slug: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let dir = std::env::temp_dir().join(APP_NAME).join(slug);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

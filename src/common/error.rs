//! Error types for the harness
//!
//! A run that hits its deadline is not an error: the kill is reported
//! through `CapturedOutput::was_killed` and callers assert on it
//! explicitly. Only conditions that abort a scenario live here.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum Error {
    // === Process Errors ===
    #[error("Binary '{name}' not found. Searched: {searched}")]
    BinaryNotFound { name: String, searched: String },

    #[error("Failed to spawn '{binary}': {reason}")]
    Spawn { binary: String, reason: String },

    #[error("Failed to deliver termination signal: {0}")]
    Kill(String),

    // === Assertion Errors ===
    #[error("Assertion failed: {message}")]
    Assertion {
        message: String,
        expected: Vec<String>,
        actual: Vec<String>,
    },

    // === Configuration Errors ===
    #[error("Filesystem error at '{path}': {error}")]
    Filesystem { path: String, error: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid settings file: {0}")]
    SettingsParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // === Serialization Errors ===
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid version: {0}")]
    Version(#[from] semver::Error),
}

impl Error {
    /// Create a binary not found error with search paths
    pub fn binary_not_found<S: AsRef<str>>(name: &str, paths: &[S]) -> Self {
        Self::BinaryNotFound {
            name: name.to_string(),
            searched: paths
                .iter()
                .map(|s| s.as_ref())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Create a spawn error
    pub fn spawn(binary: &str, reason: &str) -> Self {
        Self::Spawn {
            binary: binary.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an assertion error carrying both sequences for diagnosis
    pub fn assertion(message: &str, expected: &[String], actual: &[String]) -> Self {
        Self::Assertion {
            message: message.to_string(),
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    /// Create a filesystem error for a path
    pub fn filesystem(path: &std::path::Path, error: &io::Error) -> Self {
        Self::Filesystem {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }
}

//! proctor - a scenario-driven harness for external command-line tools
//!
//! The harness spawns a tool under test, rewrites its configuration file
//! between runs, enforces per-run deadlines, and compares the captured
//! output against expected fixtures that may vary by version.

pub mod cli;
pub mod commands;
pub mod common;
pub mod document;
pub mod matcher;
pub mod process;
pub mod scenario;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use document::{ConfigDocument, ConfigValue};
pub use matcher::ExpectedOutcome;
pub use process::{CapturedOutput, ProcessRunner, ProcessSpec};

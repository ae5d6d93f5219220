//! CLI command definitions
//!
//! Defines the clap commands for the harness CLI.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Execute a scenario defined in a YAML file
    Run {
        /// Path to the YAML scenario file
        path: PathBuf,

        /// Verbose output
        #[arg(long, short)]
        verbose: bool,

        /// Print the final report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse and validate a scenario file without running it
    Check {
        /// Path to the YAML scenario file
        path: PathBuf,
    },
}

//! CLI command handling
//!
//! Dispatches CLI commands and formats output.

use crate::commands::Commands;
use crate::common::Result;
use crate::scenario;

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            path,
            verbose,
            json,
        } => {
            let report = scenario::run_scenario(&path, verbose).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }

            if !report.passed {
                std::process::exit(1);
            }

            Ok(())
        }

        Commands::Check { path } => {
            let scenario = scenario::load(&path)?;
            println!(
                "{}: {} step{}",
                scenario.name,
                scenario.steps.len(),
                if scenario.steps.len() == 1 { "" } else { "s" }
            );
            Ok(())
        }
    }
}

//! proctor - a scenario-driven harness for external command-line tools
//!
//! Launches a tool under test as a child process, feeds it configuration
//! through a generated file, captures its output under a deadline, and
//! checks the result against expected fixtures.

use clap::Parser;
use proctor::cli;
use proctor::commands::Commands;
use proctor::common;

#[derive(Parser)]
#[command(name = "proctor", about = "Scenario-driven harness for external command-line tools")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    common::logging::init_cli();

    let cli = Cli::parse();

    if let Err(e) = cli::dispatch(cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

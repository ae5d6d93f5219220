//! Scenario model and execution
//!
//! A scenario is a scripted sequence of configuration mutations and
//! process runs with assertions, loaded from a YAML file. Steps progress
//! strictly in order; no step begins before the previous run has been
//! fully reaped.

mod config;
mod runner;

pub use config::*;
pub use runner::{execute, load, run_scenario, ScenarioReport};

//! Scenario execution
//!
//! Drives a scenario sequentially: write the configuration document, run
//! the tool, assert on the captured output, mutate, repeat. A step
//! without a deadline doubles as the calibration run whose elapsed time
//! later `baseline` deadlines are derived from. Assertion failures are
//! fail-fast: the remaining steps of the scenario never run.

use std::path::Path;
use std::time::Duration;

use colored::Colorize;
use semver::Version;

use crate::common::{paths, Error, Result, Settings};
use crate::matcher::{self, ExpectedOutcome};
use crate::process::{CapturedOutput, ProcessRunner, ProcessSpec};

use super::config::{Expectation, Scenario, TimeoutPolicy};

/// File name of the configuration document inside the config dir
const CONFIG_FILE: &str = "node";

/// Result of a scenario run
#[derive(Debug, serde::Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub passed: bool,
    pub steps_run: usize,
    pub steps_total: usize,
    pub error: Option<String>,
}

/// Load a scenario from a YAML file
pub fn load(path: &Path) -> Result<Scenario> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "Failed to read scenario '{}': {}",
            path.display(),
            e
        ))
    })?;

    serde_yaml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse scenario: {}", e)))
}

/// Run a scenario from a YAML file with the default settings
pub async fn run_scenario(path: &Path, verbose: bool) -> Result<ScenarioReport> {
    let scenario = load(path)?;
    let settings = Settings::load()?;
    execute(&scenario, &settings, verbose).await
}

/// Execute an already-loaded scenario
pub async fn execute(
    scenario: &Scenario,
    settings: &Settings,
    verbose: bool,
) -> Result<ScenarioReport> {
    let steps_total = scenario.steps.len();

    println!(
        "\n{} {}",
        "Running Scenario:".blue().bold(),
        scenario.name.white().bold()
    );
    if let Some(desc) = &scenario.description {
        println!("  {}", desc.dimmed());
    }

    let config_dir = match &scenario.config_dir {
        Some(dir) => dir.clone(),
        None => paths::scenario_dir(&scenario.name)?,
    };
    let config_path = config_dir.join(CONFIG_FILE);

    let version = scenario
        .target
        .version
        .as_deref()
        .map(Version::parse)
        .transpose()?;

    let mut doc = scenario.config.clone();
    if let Some(doc) = &doc {
        doc.write(&config_path)?;
        tracing::debug!(path = %config_path.display(), "wrote initial config document");
    }

    let runner = ProcessRunner::new()
        .with_kill_grace(Duration::from_millis(settings.timeouts.kill_grace_ms));
    let margin = Duration::from_secs(settings.timeouts.margin_secs);
    let mut baseline: Option<Duration> = None;

    println!("\n{}", "Steps:".cyan());

    for (i, step) in scenario.steps.iter().enumerate() {
        let step_num = i + 1;

        if let Some(mutation) = &step.mutate {
            let current = doc.as_ref().ok_or_else(|| {
                Error::Config("step has a mutation but the scenario has no config document".to_string())
            })?;
            let next = current.mutate(&mutation.remove, &mutation.set);
            next.write(&config_path)?;
            doc = Some(next);
        }

        let timeout = match step.timeout {
            None => None,
            Some(TimeoutPolicy::Secs(secs)) => Some(Duration::from_secs(secs)),
            Some(TimeoutPolicy::Derived(_)) => {
                let base = baseline.ok_or_else(|| {
                    Error::Config(
                        "baseline deadline requested before any calibration run".to_string(),
                    )
                })?;
                Some(base + margin)
            }
        };
        let timeout_secs = timeout.map(|t| t.as_secs());

        let mut spec = ProcessSpec::new(&scenario.target.binary);
        if doc.is_some() {
            spec = spec
                .arg("--config-dir")
                .arg(config_dir.display().to_string());
        }
        spec = spec.args_str(&step.args);
        if let Some(dir) = &scenario.target.working_dir {
            spec = spec.current_dir(dir);
        }
        for (key, value) in &scenario.target.env {
            spec = spec.env(key, value);
        }
        if let Some(t) = timeout {
            spec = spec.timeout(t);
        }

        if verbose {
            println!("  $ {} {}", spec.binary.dimmed(), spec.args.join(" ").dimmed());
        }

        let captured = runner.run(&spec).await?;

        if timeout.is_none() {
            baseline = Some(captured.elapsed);
            tracing::debug!(elapsed_ms = captured.elapsed.as_millis() as u64, "calibration run complete");
        }

        match check_step(&captured, &step.expect, version.as_ref(), timeout_secs) {
            Ok(()) => {
                println!("  {} Step {}: {}", "✓".green(), step_num, step.args.dimmed());
            }
            Err(e) => {
                println!("  {} Step {}: {}", "✗".red(), step_num, e);
                if let Error::Assertion {
                    expected, actual, ..
                } = &e
                {
                    println!("    expected: {:?}", expected);
                    println!("    actual:   {:?}", actual);
                }

                return Ok(ScenarioReport {
                    name: scenario.name.clone(),
                    passed: false,
                    steps_run: step_num,
                    steps_total,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    println!("\n{} {}\n", "✓".green().bold(), "Scenario Passed".green().bold());

    Ok(ScenarioReport {
        name: scenario.name.clone(),
        passed: true,
        steps_run: steps_total,
        steps_total,
        error: None,
    })
}

/// Check one step's expectations against the captured output
fn check_step(
    captured: &CapturedOutput,
    expect: &Expectation,
    version: Option<&Version>,
    timeout_secs: Option<u64>,
) -> Result<()> {
    let combined = captured.combined();

    if let Some(want) = expect.killed {
        if captured.was_killed != want {
            return Err(Error::assertion(
                &format!(
                    "expected was_killed={}, got was_killed={}",
                    want, captured.was_killed
                ),
                &[],
                &combined,
            ));
        }
    }

    if let Some(code) = expect.exit_code {
        if captured.exit_code != Some(code) {
            return Err(Error::assertion(
                &format!("expected exit code {}, got {:?}", code, captured.exit_code),
                &[],
                &combined,
            ));
        }
    }

    if let Some(expected) = &expect.equals {
        let expected = substitute_all(expected, timeout_secs);
        matcher::assert_lines_eq(comparable(&combined, expect.drop_last), &expected)?;
    }

    if let Some(gate) = &expect.version_gated {
        let version = version.ok_or_else(|| {
            Error::Config("target.version is required for version-gated expectations".to_string())
        })?;
        let outcome = ExpectedOutcome::VersionGated {
            threshold: Version::parse(&gate.before)?,
            pre: gate.pre.clone(),
            post: gate.post.clone(),
        };
        let expected = substitute_all(outcome.resolve(version), timeout_secs);
        matcher::assert_lines_eq(comparable(&combined, expect.drop_last), &expected)?;
    }

    if let Some(needle) = &expect.contains {
        matcher::assert_contains(&combined, &substitute(needle, timeout_secs))?;
    }

    if let Some(needle) = &expect.absent {
        matcher::assert_absent(&combined, needle)?;
    }

    Ok(())
}

fn comparable(lines: &[String], drop_last: bool) -> &[String] {
    if drop_last && !lines.is_empty() {
        &lines[..lines.len() - 1]
    } else {
        lines
    }
}

fn substitute(text: &str, timeout_secs: Option<u64>) -> String {
    match timeout_secs {
        Some(secs) => text.replace("{timeout}", &secs.to_string()),
        None => text.to_string(),
    }
}

fn substitute_all(lines: &[String], timeout_secs: Option<u64>) -> Vec<String> {
    lines.iter().map(|l| substitute(l, timeout_secs)).collect()
}

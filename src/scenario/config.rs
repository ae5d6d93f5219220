//! Scenario configuration types
//!
//! Defines the data structures for deserializing YAML scenarios.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::document::{ConfigDocument, ConfigValue};

/// A complete scenario loaded from a YAML file
#[derive(Deserialize, Debug)]
pub struct Scenario {
    /// Name of the scenario
    pub name: String,
    /// Optional description of what the scenario verifies
    pub description: Option<String>,
    /// The tool under test
    pub target: TargetConfig,
    /// Directory the configuration document is written into; defaults to
    /// a per-scenario scratch directory. The directory is exclusive to
    /// one scenario at a time.
    pub config_dir: Option<PathBuf>,
    /// Initial configuration document; when absent no file is written
    /// and no `--config-dir` flag is passed
    pub config: Option<ConfigDocument>,
    /// The sequence of steps to execute
    pub steps: Vec<ScenarioStep>,
}

/// The tool under test
#[derive(Deserialize, Debug)]
pub struct TargetConfig {
    /// Binary name or path; bare names are resolved through PATH
    pub binary: String,
    /// Version triple used to resolve version-gated expectations
    pub version: Option<String>,
    /// Environment overrides applied to every run
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Working directory for the tool
    pub working_dir: Option<PathBuf>,
}

/// One run of the tool plus its assertions
#[derive(Deserialize, Debug)]
pub struct ScenarioStep {
    /// Configuration mutation applied (and written out) before this run
    pub mutate: Option<Mutation>,
    /// Argument string, split on whitespace; the harness adds
    /// `--config-dir` itself when the scenario carries a config document
    pub args: String,
    /// Deadline policy for this run; absent means run to completion
    /// (the calibration run every baseline-derived deadline needs)
    pub timeout: Option<TimeoutPolicy>,
    /// Expectations checked against the captured output
    #[serde(default)]
    pub expect: Expectation,
}

/// Configuration document mutation
#[derive(Deserialize, Debug, Default)]
pub struct Mutation {
    /// Keys to remove; removing an absent key is a no-op
    #[serde(default)]
    pub remove: Vec<String>,
    /// Keys to add or overwrite
    #[serde(default)]
    pub set: BTreeMap<String, ConfigValue>,
}

/// Deadline policy for a step
#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(untagged)]
pub enum TimeoutPolicy {
    /// Fixed deadline in seconds
    Secs(u64),
    /// The calibration run's elapsed time plus the configured margin
    Derived(BaselineKeyword),
}

/// Marker for the `baseline` keyword in scenario files
#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum BaselineKeyword {
    Baseline,
}

/// Expectations for a step's captured output
///
/// All present fields are checked; `{timeout}` inside expected text is
/// replaced with the step's computed deadline in seconds.
#[derive(Deserialize, Debug, Default)]
pub struct Expectation {
    /// Exact expected lines
    pub equals: Option<Vec<String>>,
    /// Drop the final captured line before the equals comparison
    /// (trailing artifacts such as timing fields)
    #[serde(default)]
    pub drop_last: bool,
    /// Substring that must appear in the joined output
    pub contains: Option<String>,
    /// Substring that must not appear in the joined output
    pub absent: Option<String>,
    /// Whether the run must have been killed by its deadline
    pub killed: Option<bool>,
    /// Expected exit code of a natural exit
    pub exit_code: Option<i32>,
    /// Version-gated variant of `equals`
    pub version_gated: Option<VersionGate>,
}

/// Version-gated expected lines
#[derive(Deserialize, Debug)]
pub struct VersionGate {
    /// Threshold version: targets strictly older than this expect `pre`,
    /// the threshold itself and anything newer expect `post`
    pub before: String,
    #[serde(default)]
    pub pre: Vec<String>,
    #[serde(default)]
    pub post: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_scenario() {
        let yaml = r#"
name: masterless fallback
description: Endpoint removal forces the retry loop.
target:
  binary: rex-call
  version: "0.10.8"
  env:
    REX_LOG: quiet
config:
  id: harness-node
  master: localhost
  master_port: 64506
  open_mode: true
steps:
  - args: cmd.run "echo foo"
    expect:
      contains: "local: foo"
  - mutate:
      remove: [master, master_port]
    args: cmd.run "echo foo"
    timeout: baseline
    expect:
      killed: true
      contains: "Process took more than {timeout} seconds"
  - mutate:
      set: { file_client: local }
    args: cmd.run "echo foo"
    timeout: 15
    expect:
      contains: "local: foo"
"#;
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(scenario.name, "masterless fallback");
        assert_eq!(scenario.steps.len(), 3);

        let doc = scenario.config.unwrap();
        assert!(doc.contains_key("master_port"));

        assert!(matches!(
            scenario.steps[1].timeout,
            Some(TimeoutPolicy::Derived(BaselineKeyword::Baseline))
        ));
        assert!(matches!(
            scenario.steps[2].timeout,
            Some(TimeoutPolicy::Secs(15))
        ));
        assert_eq!(scenario.steps[1].expect.killed, Some(true));
    }

    #[test]
    fn expectation_defaults_are_empty() {
        let yaml = r#"
name: bare
target:
  binary: rex-call
steps:
  - args: test.ping
"#;
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        let expect = &scenario.steps[0].expect;
        assert!(expect.equals.is_none());
        assert!(expect.contains.is_none());
        assert!(!expect.drop_last);
        assert!(scenario.config.is_none());
    }
}

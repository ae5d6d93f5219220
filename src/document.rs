//! On-disk configuration document for the tool under test
//!
//! A scenario owns one document for its whole lifetime: it is written
//! before the first run and rewritten after each mutation. Mutations
//! produce a fresh document so steps never alias each other's state.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::{Error, Result};

/// A single configuration value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for ConfigValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// The child process's configuration document
///
/// Backed by a BTreeMap so serialization is deterministic no matter the
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigDocument(BTreeMap<String, ConfigValue>);

impl ConfigDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key in place; construction-time convenience
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Return a new document with `removals` dropped and `additions`
    /// inserted (overwriting existing keys). The receiver is untouched.
    ///
    /// Removing a key that was never present is a no-op.
    pub fn mutate(
        &self,
        removals: &[String],
        additions: &BTreeMap<String, ConfigValue>,
    ) -> Self {
        let mut next = self.clone();
        for key in removals {
            next.0.remove(key);
        }
        for (key, value) in additions {
            next.0.insert(key.clone(), value.clone());
        }
        next
    }

    /// Serialize the document as block-style YAML to `path`, overwriting
    /// any existing file.
    ///
    /// The parent directory must already exist; scenario setup is
    /// responsible for creating it.
    pub fn write(&self, path: &Path) -> Result<()> {
        let text = serde_yaml::to_string(self)?;
        std::fs::write(path, text).map_err(|e| Error::filesystem(path, &e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConfigDocument {
        let mut doc = ConfigDocument::new();
        doc.set("id", "harness-node")
            .set("master", "localhost")
            .set("master_port", 64506)
            .set("open_mode", true);
        doc
    }

    #[test]
    fn removal_of_absent_key_is_noop() {
        let doc = sample();
        let next = doc.mutate(&["never_there".to_string()], &BTreeMap::new());
        assert_eq!(doc, next);
    }

    #[test]
    fn addition_overwrites_without_touching_others() {
        let doc = sample();
        let mut additions = BTreeMap::new();
        additions.insert("master".to_string(), ConfigValue::from("remote-host"));
        let next = doc.mutate(&[], &additions);

        assert_eq!(next.get("master"), Some(&ConfigValue::from("remote-host")));
        assert_eq!(next.get("master_port"), Some(&ConfigValue::Int(64506)));
        assert_eq!(next.len(), doc.len());
        // the original is untouched
        assert_eq!(doc.get("master"), Some(&ConfigValue::from("localhost")));
    }

    #[test]
    fn removal_keeps_unrelated_keys() {
        let doc = sample();
        let removals = ["master".to_string(), "master_port".to_string()];
        let next = doc.mutate(&removals, &BTreeMap::new());

        assert!(!next.contains_key("master"));
        assert!(!next.contains_key("master_port"));
        assert_eq!(next.get("id"), Some(&ConfigValue::from("harness-node")));
        assert_eq!(next.get("open_mode"), Some(&ConfigValue::Bool(true)));
    }

    #[test]
    fn write_requires_existing_directory() {
        let doc = sample();
        let missing = std::path::Path::new("/nonexistent-proctor-dir/node");
        match doc.write(missing) {
            Err(Error::Filesystem { .. }) => {}
            other => panic!("expected filesystem error, got {:?}", other),
        }
    }

    #[test]
    fn write_overwrites_and_stays_parseable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node");

        sample().write(&path).unwrap();
        let shrunk = sample().mutate(&["master".to_string()], &BTreeMap::new());
        shrunk.write(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let reloaded: ConfigDocument = serde_yaml::from_str(&text).unwrap();
        assert_eq!(reloaded, shrunk);
        assert!(!text.contains("master:"));
    }
}

//! Output comparison against expected fixtures
//!
//! The matcher never trims or normalizes: callers that need to exclude a
//! trailing artifact line (timing fields, prompt banners) drop it before
//! comparing.

use semver::Version;

use crate::common::{Error, Result};

/// Expected output for a run, possibly gated on the tool's version
///
/// Some CLI behaviors exist only before a given release (deprecation
/// warnings). Fixtures branch on the version as an explicit variant
/// rather than patching strings at runtime.
#[derive(Debug, Clone)]
pub enum ExpectedOutcome {
    /// A literal sequence of expected lines
    Lines(Vec<String>),
    /// Two literal sequences selected by version: targets strictly older
    /// than `threshold` expect `pre`, the threshold itself and anything
    /// newer expect `post`.
    VersionGated {
        threshold: Version,
        pre: Vec<String>,
        post: Vec<String>,
    },
}

impl ExpectedOutcome {
    /// Pick the literal sequence matching `version`
    pub fn resolve(&self, version: &Version) -> &[String] {
        match self {
            Self::Lines(lines) => lines,
            Self::VersionGated {
                threshold,
                pre,
                post,
            } => {
                if version < threshold {
                    pre
                } else {
                    post
                }
            }
        }
    }
}

/// Exact sequence comparison
pub fn assert_lines_eq(actual: &[String], expected: &[String]) -> Result<()> {
    if actual != expected {
        return Err(Error::assertion(
            "output lines did not match",
            expected,
            actual,
        ));
    }
    Ok(())
}

/// Substring check over the newline-joined output
pub fn assert_contains(actual: &[String], needle: &str) -> Result<()> {
    if !actual.join("\n").contains(needle) {
        return Err(Error::assertion(
            &format!("output does not contain '{}'", needle),
            &[needle.to_string()],
            actual,
        ));
    }
    Ok(())
}

/// Inverse of [`assert_contains`]
pub fn assert_absent(actual: &[String], needle: &str) -> Result<()> {
    if actual.join("\n").contains(needle) {
        return Err(Error::assertion(
            &format!("output unexpectedly contains '{}'", needle),
            &[needle.to_string()],
            actual,
        ));
    }
    Ok(())
}

/// Concatenate the lines and cut everything from the final comma onward.
///
/// The abbreviated text format ends with a timing field after the last
/// comma; comparisons use the stable prefix.
pub fn joined_prefix_until_last_comma(lines: &[String]) -> String {
    let joined = lines.concat();
    match joined.rfind(',') {
        Some(idx) => joined[..idx].to_string(),
        None => joined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn version_boundary_is_inclusive_on_the_high_side() {
        let outcome = ExpectedOutcome::VersionGated {
            threshold: Version::new(0, 10, 8),
            pre: lines(&["WARNING: deprecated"]),
            post: lines(&[]),
        };

        assert_eq!(
            outcome.resolve(&Version::new(0, 10, 7)),
            lines(&["WARNING: deprecated"]).as_slice()
        );
        assert!(outcome.resolve(&Version::new(0, 10, 8)).is_empty());
        assert!(outcome.resolve(&Version::new(0, 11, 0)).is_empty());
    }

    #[test]
    fn literal_outcome_ignores_version() {
        let outcome = ExpectedOutcome::Lines(lines(&["local: foo"]));
        assert_eq!(
            outcome.resolve(&Version::new(9, 9, 9)),
            lines(&["local: foo"]).as_slice()
        );
    }

    #[test]
    fn mismatch_carries_both_sequences() {
        let actual = lines(&["local: bar"]);
        let expected = lines(&["local: foo"]);
        match assert_lines_eq(&actual, &expected) {
            Err(Error::Assertion {
                expected: e,
                actual: a,
                ..
            }) => {
                assert_eq!(e, expected);
                assert_eq!(a, actual);
            }
            other => panic!("expected assertion error, got {:?}", other),
        }
    }

    #[test]
    fn contains_checks_the_joined_output() {
        let actual = lines(&["first half", "second half"]);
        // the needle may span a single line but not the line break
        assert!(assert_contains(&actual, "second").is_ok());
        assert!(assert_contains(&actual, "half second").is_err());
        assert!(assert_absent(&actual, "third").is_ok());
        assert!(assert_absent(&actual, "first").is_err());
    }

    #[test]
    fn truncation_stops_at_the_final_comma() {
        let actual = lines(&["local: ([0, 1, 1, 2], 1.9e-05)"]);
        assert_eq!(
            joined_prefix_until_last_comma(&actual),
            "local: ([0, 1, 1, 2]"
        );
        assert_eq!(
            joined_prefix_until_last_comma(&lines(&["no comma here"])),
            "no comma here"
        );
    }
}

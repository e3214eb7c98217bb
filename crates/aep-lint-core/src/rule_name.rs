//! Hierarchical rule names and rule-name prefixes.
//!
//! Every rule is addressed as `category::group::name`, for example
//! `core::0131::request-message-name`. Configuration and suppression
//! directives target rules through prefixes of one, two, or three segments.

use serde::{Serialize, Serializer};
use std::fmt;

/// Separator between rule-name segments.
pub const SEPARATOR: &str = "::";

/// Errors from parsing rule names and prefixes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    /// Input had the wrong number of segments.
    #[error("`{input}` has {found} segment(s), expected {expected}")]
    SegmentCount {
        /// The rejected input.
        input: String,
        /// Number of segments found.
        found: usize,
        /// Human-readable expectation (e.g. "3" or "1 to 3").
        expected: &'static str,
    },

    /// A segment was empty or contained characters outside `[a-z0-9-]`.
    #[error("`{input}` has invalid segment `{segment}` (allowed: a-z, 0-9, -)")]
    InvalidSegment {
        /// The rejected input.
        input: String,
        /// The offending segment.
        segment: String,
    },
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn split_segments(
    input: &str,
    min: usize,
    max: usize,
    expected: &'static str,
) -> Result<Vec<String>, NameError> {
    let segments: Vec<&str> = input.split(SEPARATOR).collect();
    if segments.len() < min || segments.len() > max {
        return Err(NameError::SegmentCount {
            input: input.to_string(),
            found: segments.len(),
            expected,
        });
    }
    if let Some(bad) = segments.iter().find(|s| !is_valid_segment(s)) {
        return Err(NameError::InvalidSegment {
            input: input.to_string(),
            segment: (*bad).to_string(),
        });
    }
    Ok(segments.into_iter().map(String::from).collect())
}

/// A validated three-segment rule name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleName {
    category: String,
    group: String,
    name: String,
}

impl RuleName {
    /// Parses a rule name of the form `category::group::name`.
    ///
    /// # Errors
    ///
    /// Returns [`NameError`] unless the input has exactly three non-empty
    /// segments made of lowercase ASCII letters, digits, and hyphens.
    pub fn parse(input: &str) -> Result<Self, NameError> {
        let mut segments = split_segments(input, 3, 3, "3")?.into_iter();
        match (segments.next(), segments.next(), segments.next()) {
            (Some(category), Some(group), Some(name)) => Ok(Self {
                category,
                group,
                name,
            }),
            _ => Err(NameError::SegmentCount {
                input: input.to_string(),
                found: 0,
                expected: "3",
            }),
        }
    }

    /// The first segment (e.g. `core`).
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// The second segment, usually the AEP number (e.g. `0131`).
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// The last segment (e.g. `request-message-name`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the segments in order.
    #[must_use]
    pub fn segments(&self) -> [&str; 3] {
        [&self.category, &self.group, &self.name]
    }

    /// Returns the documentation URI for this rule.
    ///
    /// Core rules live at `<base>/<group>/<name>`, every other category at
    /// `<base>/<category>/<group>/<name>`.
    #[must_use]
    pub fn uri(&self) -> String {
        if self.category == "core" {
            format!("{DOCS_BASE_URL}/{}/{}", self.group, self.name)
        } else {
            format!(
                "{DOCS_BASE_URL}/{}/{}/{}",
                self.category, self.group, self.name
            )
        }
    }
}

/// Base URL of the rule documentation site.
pub const DOCS_BASE_URL: &str = "https://linter.aep.dev";

impl fmt::Display for RuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            self.category, self.group, self.name
        )
    }
}

impl std::str::FromStr for RuleName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for RuleName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A validated leading portion of a rule name: one, two, or three segments.
///
/// `core` matches a whole category, `core::0131` a group, and a full name
/// matches exactly one rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleNamePrefix(Vec<String>);

impl RuleNamePrefix {
    /// Parses a prefix of one to three segments.
    ///
    /// # Errors
    ///
    /// Returns [`NameError`] for empty input, more than three segments, or a
    /// segment with characters outside `[a-z0-9-]`.
    pub fn parse(input: &str) -> Result<Self, NameError> {
        split_segments(input, 1, 3, "1 to 3").map(Self)
    }

    /// Number of segments; longer prefixes are more specific.
    #[must_use]
    pub fn specificity(&self) -> usize {
        self.0.len()
    }

    /// Tests whether this prefix covers `rule`.
    #[must_use]
    pub fn matches(&self, rule: &RuleName) -> bool {
        self.0
            .iter()
            .zip(rule.segments())
            .all(|(prefix, segment)| prefix == segment)
    }
}

impl fmt::Display for RuleNamePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(SEPARATOR))
    }
}

impl From<&RuleName> for RuleNamePrefix {
    fn from(name: &RuleName) -> Self {
        Self(name.segments().iter().map(|s| (*s).to_string()).collect())
    }
}

/// Whether a rule is switched on or off by a configuration entry or directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleState {
    /// Rule runs / problems are reported.
    Enabled,
    /// Rule is skipped / problems are dropped.
    Disabled,
}

/// Picks the state of the longest prefix in `entries` that matches `rule`.
///
/// Returns `None` when nothing matches. On an equal-length tie `Disabled`
/// wins; configuration layers reject such ties at load time, so only
/// suppression directives can reach that branch.
pub fn longest_match<'a, I>(entries: I, rule: &RuleName) -> Option<RuleState>
where
    I: IntoIterator<Item = (&'a RuleNamePrefix, RuleState)>,
{
    entries
        .into_iter()
        .filter(|(prefix, _)| prefix.matches(rule))
        .max_by_key(|(prefix, state)| (prefix.specificity(), *state))
        .map(|(_, state)| state)
}

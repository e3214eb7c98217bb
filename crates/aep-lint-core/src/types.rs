//! Core types for lint problems and per-file responses.

use crate::rule_name::RuleName;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Source span in a proto file.
///
/// Lines and columns are 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Start line.
    pub line: usize,
    /// Start column.
    pub column: usize,
    /// End line (inclusive).
    pub end_line: usize,
    /// End column (exclusive).
    pub end_column: usize,
}

impl Location {
    /// Creates a zero-width location at a single position.
    #[must_use]
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            line,
            column,
            end_line: line,
            end_column: column,
        }
    }

    /// Sets the end of the span.
    #[must_use]
    pub fn with_end(mut self, end_line: usize, end_column: usize) -> Self {
        self.end_line = end_line;
        self.end_column = end_column;
        self
    }

    /// Converts a protobuf `SourceCodeInfo` span.
    ///
    /// Protobuf spans are 0-indexed and come as `[line, col, end_col]` when
    /// the span stays on one line, else `[line, col, end_line, end_col]`.
    /// Any other shape (or a negative value) yields `None`.
    #[must_use]
    pub fn from_proto_span(span: &[i32]) -> Option<Self> {
        let converted: Vec<usize> = span
            .iter()
            .map(|v| usize::try_from(*v).ok().map(|v| v + 1))
            .collect::<Option<_>>()?;
        match converted.as_slice() {
            [line, column, end_column] => {
                Some(Self::new(*line, *column).with_end(*line, *end_column))
            }
            [line, column, end_line, end_column] => {
                Some(Self::new(*line, *column).with_end(*end_line, *end_column))
            }
            _ => None,
        }
    }

    fn start(&self) -> (usize, usize) {
        (self.line, self.column)
    }

    fn end(&self) -> (usize, usize) {
        (self.end_line, self.end_column)
    }

    /// Whether `other` starts inside this span.
    #[must_use]
    pub fn contains(&self, other: &Location) -> bool {
        self.start() <= other.start() && other.start() <= self.end()
    }

    /// Orders spans so that nested ones sort after their enclosing span.
    pub(crate) fn nesting_key(&self) -> ((usize, usize), std::cmp::Reverse<(usize, usize)>) {
        (self.start(), std::cmp::Reverse(self.end()))
    }
}

/// A problem as returned by a rule body, before the engine attributes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProblem {
    /// Human-readable message.
    pub message: String,
    /// Fully-qualified name of the owning declaration; empty for the file itself.
    pub descriptor: String,
    /// Explicit location; the engine falls back to the descriptor's span.
    pub location: Option<Location>,
}

impl RawProblem {
    /// Creates a problem owned by the given declaration.
    #[must_use]
    pub fn new(descriptor: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            descriptor: descriptor.into(),
            location: None,
        }
    }

    /// Creates a problem owned by the file rather than a declaration.
    #[must_use]
    pub fn for_file(message: impl Into<String>) -> Self {
        Self::new(String::new(), message)
    }

    /// Pins the problem to an explicit location.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

/// What produced a [`Problem`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProblemKind {
    /// A rule reported a violation.
    #[default]
    Violation,
    /// A rule crashed; the problem stands in for its results.
    RuleDefect,
}

impl ProblemKind {
    fn is_violation(&self) -> bool {
        *self == Self::Violation
    }
}

/// A problem attributed to a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Problem {
    /// The rule that reported this problem.
    pub rule_id: RuleName,
    /// Documentation URI of the rule.
    pub rule_uri: String,
    /// Human-readable message.
    pub message: String,
    /// Fully-qualified name of the owning declaration.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub descriptor: String,
    /// Resolved location, if any is known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Whether this is a regular violation or a rule defect marker.
    #[serde(skip_serializing_if = "ProblemKind::is_violation")]
    pub kind: ProblemKind,
}

impl Problem {
    /// Attributes a raw problem to `rule`, using `location` as the resolved span.
    #[must_use]
    pub fn attribute(raw: RawProblem, rule: &RuleName, location: Option<Location>) -> Self {
        Self {
            rule_id: rule.clone(),
            rule_uri: rule.uri(),
            message: raw.message,
            descriptor: raw.descriptor,
            location,
            kind: ProblemKind::Violation,
        }
    }

    /// Creates the synthetic problem that replaces a crashed rule's output.
    #[must_use]
    pub fn rule_defect(rule: &RuleName, detail: &str) -> Self {
        Self {
            rule_id: rule.clone(),
            rule_uri: rule.uri(),
            message: format!("rule `{rule}` failed to run: {detail}"),
            descriptor: String::new(),
            location: None,
            kind: ProblemKind::RuleDefect,
        }
    }

    /// Orders positioned problems by start position, location-less ones last.
    #[must_use]
    pub fn position_cmp(&self, other: &Self) -> Ordering {
        match (&self.location, &other.location) {
            (Some(a), Some(b)) => a.start().cmp(&b.start()),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }

    /// Formats the problem for terminal output.
    #[must_use]
    pub fn format(&self, file_path: &str) -> String {
        use std::fmt::Write;
        let mut output = match &self.location {
            Some(loc) => format!(
                "{} at {}:{}:{}\n",
                self.rule_id, file_path, loc.line, loc.column
            ),
            None => format!("{} at {}\n", self.rule_id, file_path),
        };
        let _ = writeln!(output, "  {}", self.message);
        let _ = writeln!(output, "  = see: {}", self.rule_uri);
        output
    }
}

/// All problems one pipeline found in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    /// Path of the linted file.
    pub file_path: String,
    /// Problems in source order.
    pub problems: Vec<Problem>,
}

impl Response {
    /// Creates an empty response for `file_path`.
    #[must_use]
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            problems: Vec::new(),
        }
    }
}

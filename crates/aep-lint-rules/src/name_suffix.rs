//! Fields should not use the suffix `_name`.
//!
//! `author_name` is ambiguous next to resource names; `author` (or
//! `display_name` for human-readable text) says what it holds.
//!
//! Allowed: `display_name`, `given_name`, `family_name`.

use aep_lint_core::{ProtoFile, RawProblem, Rule};

/// Rule name for name-suffix.
pub const NAME: &str = "core::0122::name-suffix";

const SUFFIX: &str = "_name";
const ALLOWED: &[&str] = &["display_name", "given_name", "family_name"];

/// Flags fields whose names end in `_name`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameSuffix;

impl NameSuffix {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl<F: ProtoFile + ?Sized> Rule<F> for NameSuffix {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Fields should not use the suffix `_name`"
    }

    fn lint(&self, file: &F) -> Vec<RawProblem> {
        file.fields()
            .filter(|field| !ALLOWED.contains(&field.name.as_str()))
            .filter_map(|field| {
                let stem = field.name.strip_suffix(SUFFIX)?;
                Some(RawProblem::new(
                    field.full_name.clone(),
                    format!(
                        "Fields should not use the suffix `{SUFFIX}`. Consider `{stem}` instead of `{}`.",
                        field.name
                    ),
                ))
            })
            .collect()
    }
}

//! Reconciles the responses of the legacy and native pipelines.

use crate::types::{Problem, Response};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Which pipeline produced a set of problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Pipeline {
    /// Rules over the legacy descriptor representation.
    Legacy,
    /// Rules over the native descriptor representation.
    Native,
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::Native => write!(f, "native"),
        }
    }
}

/// Both pipelines' problems for one file, kept apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinedResult {
    /// Path of the linted file.
    pub file_path: String,
    /// Problems from the legacy pipeline.
    pub legacy: Vec<Problem>,
    /// Problems from the native pipeline.
    pub native: Vec<Problem>,
}

impl CombinedResult {
    /// Creates a result with no problems.
    #[must_use]
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            legacy: Vec::new(),
            native: Vec::new(),
        }
    }

    /// Problems reported by one pipeline.
    #[must_use]
    pub fn problems(&self, pipeline: Pipeline) -> &[Problem] {
        match pipeline {
            Pipeline::Legacy => &self.legacy,
            Pipeline::Native => &self.native,
        }
    }

    /// Whether either pipeline reported anything.
    #[must_use]
    pub fn has_problems(&self) -> bool {
        !self.legacy.is_empty() || !self.native.is_empty()
    }

    /// Total problem count across both pipelines.
    #[must_use]
    pub fn problem_count(&self) -> usize {
        self.legacy.len() + self.native.len()
    }
}

/// Merges per-file responses: legacy paths first in their given order, then
/// native-only paths in theirs.
///
/// If a pipeline lists a path twice, its problems are appended to the same
/// entry in the order given.
#[must_use]
pub fn merge(legacy: Vec<Response>, native: Vec<Response>) -> Vec<CombinedResult> {
    let mut results: Vec<CombinedResult> = Vec::with_capacity(legacy.len() + native.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    let mut slot = |results: &mut Vec<CombinedResult>, path: String| -> usize {
        *index.entry(path).or_insert_with_key(|path| {
            results.push(CombinedResult::new(path.clone()));
            results.len() - 1
        })
    };

    for response in legacy {
        let i = slot(&mut results, response.file_path);
        results[i].legacy.extend(response.problems);
    }
    for response in native {
        let i = slot(&mut results, response.file_path);
        results[i].native.extend(response.problems);
    }
    results
}

/// Whether any merged file has problems.
#[must_use]
pub fn any_problems(results: &[CombinedResult]) -> bool {
    results.iter().any(CombinedResult::has_problems)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule_name::RuleName;
    use crate::types::RawProblem;

    fn response(path: &str, messages: &[&str]) -> Response {
        let rule = RuleName::parse("core::0131::request-message-name").unwrap();
        Response {
            file_path: path.to_string(),
            problems: messages
                .iter()
                .map(|m| Problem::attribute(RawProblem::for_file(*m), &rule, None))
                .collect(),
        }
    }

    fn paths(results: &[CombinedResult]) -> Vec<&str> {
        results.iter().map(|r| r.file_path.as_str()).collect()
    }

    #[test]
    fn merge_with_empty_native_keeps_legacy_order() {
        let legacy = vec![
            response("z.proto", &["one"]),
            response("a.proto", &[]),
            response("m.proto", &["two", "three"]),
        ];
        let results = merge(legacy.clone(), Vec::new());
        assert_eq!(paths(&results), vec!["z.proto", "a.proto", "m.proto"]);
        for (result, original) in results.iter().zip(&legacy) {
            assert_eq!(result.legacy, original.problems);
            assert!(result.native.is_empty());
        }
    }

    #[test]
    fn native_only_paths_are_appended() {
        let results = merge(
            vec![response("a.proto", &["legacy"])],
            vec![response("b.proto", &["native b"]), response("a.proto", &["native a"])],
        );
        assert_eq!(paths(&results), vec!["a.proto", "b.proto"]);
        assert_eq!(results[0].legacy[0].message, "legacy");
        assert_eq!(results[0].native[0].message, "native a");
        assert!(results[1].legacy.is_empty());
        assert_eq!(results[1].problems(Pipeline::Native)[0].message, "native b");
    }

    #[test]
    fn has_problems_checks_both_lists() {
        let results = merge(
            vec![response("a.proto", &[]), response("b.proto", &[])],
            vec![response("b.proto", &["x"])],
        );
        assert!(!results[0].has_problems());
        assert!(results[1].has_problems());
        assert_eq!(results[1].problem_count(), 1);
        assert!(any_problems(&results));
        assert!(!any_problems(&results[..1]));
    }

    #[test]
    fn repeated_path_within_one_pipeline_is_folded() {
        let results = merge(
            vec![response("a.proto", &["first"]), response("a.proto", &["second"])],
            Vec::new(),
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].legacy.len(), 2);
        assert_eq!(results[0].legacy[1].message, "second");
    }

    #[test]
    fn merge_is_deterministic() {
        let build = || {
            merge(
                (0..50).map(|i| response(&format!("f{i}.proto"), &["p"])).collect(),
                (25..75).map(|i| response(&format!("f{i}.proto"), &["q"])).collect(),
            )
        };
        let first = serde_json::to_string(&build()).unwrap();
        let second = serde_json::to_string(&build()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn pipeline_display() {
        assert_eq!(Pipeline::Legacy.to_string(), "legacy");
        assert_eq!(Pipeline::Native.to_string(), "native");
    }
}

//! Comment-based suppression directives.
//!
//! Supports directives like:
//! ```text
//! // (-- api-linter: core::0131::request-message-name=disabled
//! //     aep.dev/not-precedent: Legacy method name. --)
//! ```
//!
//! A directive on the file (the `syntax` or `package` statement) covers the
//! whole file; a directive on a declaration covers it and everything nested
//! inside. Nearer scopes override outer ones, so a method can re-enable a
//! rule its service disabled with `<prefix>=enabled`.

use crate::descriptor::{Comments, ProtoFile};
use crate::rule_name::{longest_match, RuleName, RuleNamePrefix, RuleState};
use crate::types::Location;
use std::collections::HashMap;

/// Marker that starts a directive inside a comment.
pub const DIRECTIVE_MARKER: &str = "api-linter:";

/// Parsed suppression directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Rule-name prefix the directive targets.
    pub prefix: RuleNamePrefix,
    /// State the directive sets.
    pub state: RuleState,
}

/// Parses every directive in one comment. Malformed directives are skipped.
#[must_use]
pub fn parse_directives(comment: &str) -> Vec<Directive> {
    comment
        .match_indices(DIRECTIVE_MARKER)
        .filter_map(|(start, _)| parse_directive(&comment[start + DIRECTIVE_MARKER.len()..]))
        .collect()
}

fn parse_directive(rest: &str) -> Option<Directive> {
    let token = rest.split_whitespace().next()?;
    let (prefix, state) = token.split_once('=')?;
    let state = match state {
        "disabled" => RuleState::Disabled,
        "enabled" => RuleState::Enabled,
        _ => return None,
    };
    let prefix = RuleNamePrefix::parse(prefix).ok()?;
    Some(Directive { prefix, state })
}

fn scan(comments: &Comments) -> Vec<Directive> {
    comments.iter().flat_map(parse_directives).collect()
}

/// Per-file lookup of suppression directives.
///
/// Built once per file before any rule runs, then shared read-only.
#[derive(Debug, Clone, Default)]
pub struct SuppressionIndex {
    bypassed: bool,
    file: Vec<Directive>,
    declarations: HashMap<String, Vec<Directive>>,
    parents: HashMap<String, String>,
    spans: Vec<(String, Location)>,
}

impl SuppressionIndex {
    /// Scans the file comments and every declaration's comments.
    #[must_use]
    pub fn build<F: ProtoFile + ?Sized>(file: &F) -> Self {
        let mut declarations = HashMap::new();
        let mut parents = HashMap::new();
        let mut spans = Vec::new();
        for decl in file.declarations() {
            if let Some(span) = decl.span {
                spans.push((decl.full_name.clone(), span));
            }
            let directives = scan(&decl.comments);
            if !directives.is_empty() {
                declarations.insert(decl.full_name.clone(), directives);
            }
            if let Some(parent) = &decl.parent {
                parents.insert(decl.full_name.clone(), parent.clone());
            }
        }
        let index = Self {
            bypassed: false,
            file: scan(file.file_comments()),
            declarations,
            parents,
            spans,
        };
        tracing::trace!(
            "{}: {} file directive(s), {} declaration(s) with directives",
            file.path(),
            index.file.len(),
            index.declarations.len()
        );
        index
    }

    /// An index that never suppresses anything.
    #[must_use]
    pub fn bypassed() -> Self {
        Self {
            bypassed: true,
            ..Self::default()
        }
    }

    /// Whether this index ignores all directives.
    #[must_use]
    pub fn is_bypassed(&self) -> bool {
        self.bypassed
    }

    /// Tests whether problems of `rule` on `descriptor` are suppressed.
    ///
    /// `descriptor` is a fully-qualified declaration name; an empty or
    /// unknown name only sees file-level directives.
    #[must_use]
    pub fn is_suppressed(&self, descriptor: &str, rule: &RuleName) -> bool {
        if self.bypassed {
            return false;
        }

        let mut state = Self::decide(&self.file, rule);
        for scope in self.scopes_outermost_first(descriptor) {
            if let Some(directives) = self.declarations.get(scope) {
                if let Some(decided) = Self::decide(directives, rule) {
                    state = Some(decided);
                }
            }
        }
        state == Some(RuleState::Disabled)
    }

    /// Tests whether a problem of `rule` owned by `descriptor` and reported
    /// at `location` is suppressed.
    ///
    /// Directives on the owning declaration's scopes apply, and so do those
    /// on the scopes of the innermost declaration whose span contains
    /// `location`.
    #[must_use]
    pub fn is_suppressed_at(
        &self,
        descriptor: &str,
        location: Option<&Location>,
        rule: &RuleName,
    ) -> bool {
        if self.is_suppressed(descriptor, rule) {
            return true;
        }
        location
            .and_then(|loc| self.declaration_at(loc))
            .is_some_and(|decl| decl != descriptor && self.is_suppressed(decl, rule))
    }

    /// The innermost declaration whose span contains `location`.
    #[must_use]
    pub fn declaration_at(&self, location: &Location) -> Option<&str> {
        self.spans
            .iter()
            .filter(|(_, span)| span.contains(location))
            .max_by_key(|(_, span)| span.nesting_key())
            .map(|(name, _)| name.as_str())
    }

    fn decide(directives: &[Directive], rule: &RuleName) -> Option<RuleState> {
        longest_match(directives.iter().map(|d| (&d.prefix, d.state)), rule)
    }

    fn scopes_outermost_first<'a>(&'a self, descriptor: &'a str) -> Vec<&'a str> {
        let mut chain = Vec::new();
        if descriptor.is_empty() {
            return chain;
        }
        let mut current = Some(descriptor);
        while let Some(name) = current {
            chain.push(name);
            current = self.parents.get(name).map(String::as_str);
        }
        chain.reverse();
        chain
    }
}

//! Rule trait for defining lint rules.

use crate::descriptor::ProtoFile;
use crate::types::RawProblem;

/// A per-file lint rule over a compiled proto file.
///
/// Rules are generic over the descriptor representation so the same body
/// can serve both pipelines. They must be pure: the same file must always
/// produce the same problems in the same order.
///
/// # Example
///
/// ```ignore
/// use aep_lint_core::{ProtoFile, RawProblem, Rule};
///
/// pub struct NoEmptyPackage;
///
/// impl<F: ProtoFile + ?Sized> Rule<F> for NoEmptyPackage {
///     fn name(&self) -> &'static str { "core::0191::package-required" }
///
///     fn lint(&self, file: &F) -> Vec<RawProblem> {
///         if file.package().is_empty() {
///             vec![RawProblem::for_file("Proto files must declare a package.")]
///         } else {
///             vec![]
///         }
///     }
/// }
/// ```
pub trait Rule<F: ?Sized>: Send + Sync {
    /// Returns the full rule name (e.g., "core::0131::request-message-name").
    fn name(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Checks a single file and returns any problems found.
    fn lint(&self, file: &F) -> Vec<RawProblem>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox<F> = Box<dyn Rule<F>>;

/// Adapts a closure into a [`Rule`].
///
/// Handy for one-off rules in tests and for embedding callers that do not
/// want a named type per check.
pub struct FnRule<L> {
    name: &'static str,
    description: &'static str,
    lint: L,
}

impl<L> FnRule<L> {
    /// Wraps `lint` under `name`.
    pub fn new<F: ?Sized>(name: &'static str, lint: L) -> Self
    where
        L: Fn(&F) -> Vec<RawProblem>,
    {
        Self {
            name,
            description: "",
            lint,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }
}

impl<F, L> Rule<F> for FnRule<L>
where
    F: ProtoFile + ?Sized,
    L: Fn(&F) -> Vec<RawProblem> + Send + Sync,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn lint(&self, file: &F) -> Vec<RawProblem> {
        (self.lint)(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::native::NativeFile;

    struct PackageRequired;

    impl<F: ProtoFile + ?Sized> Rule<F> for PackageRequired {
        fn name(&self) -> &'static str {
            "core::0191::package-required"
        }
        fn description(&self) -> &'static str {
            "A test rule"
        }
        fn lint(&self, file: &F) -> Vec<RawProblem> {
            if file.package().is_empty() {
                vec![RawProblem::for_file("missing package")]
            } else {
                vec![]
            }
        }
    }

    #[test]
    fn test_rule_trait() {
        let file = NativeFile::builder("a.proto", "").build().unwrap();
        let rule = PackageRequired;
        assert_eq!(Rule::<NativeFile>::name(&rule), "core::0191::package-required");
        assert_eq!(rule.lint(&file).len(), 1);
    }

    #[test]
    fn fn_rule_delegates() {
        let file = NativeFile::builder("a.proto", "acme").build().unwrap();
        let rule = FnRule::new("core::0001::always", |_: &NativeFile| {
            vec![RawProblem::for_file("always")]
        })
        .with_description("fires on every file");
        assert_eq!(rule.description(), "fires on every file");
        assert_eq!(rule.lint(&file)[0].message, "always");
    }
}

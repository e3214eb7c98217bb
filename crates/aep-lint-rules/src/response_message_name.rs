//! Get methods must return the resource itself.

use aep_lint_core::descriptor::simple_name;
use aep_lint_core::{DeclarationKind, ProtoFile, RawProblem, Rule};

/// Rule name for response-message-name.
pub const NAME: &str = "core::0131::response-message-name";

/// Checks that `GetBook` returns `Book`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseMessageName;

impl ResponseMessageName {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl<F: ProtoFile + ?Sized> Rule<F> for ResponseMessageName {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Get methods must return the resource"
    }

    fn lint(&self, file: &F) -> Vec<RawProblem> {
        let mut problems = Vec::new();
        for method in file.methods() {
            let Some(resource) = crate::get_method_resource(&method.name) else {
                continue;
            };
            let DeclarationKind::Method { output_type, .. } = &method.kind else {
                continue;
            };
            let got = simple_name(output_type);
            if got != resource {
                problems.push(RawProblem::new(
                    method.full_name.clone(),
                    format!("Get RPCs should return the resource `{resource}`, not `{got}`."),
                ));
            }
        }
        problems
    }
}

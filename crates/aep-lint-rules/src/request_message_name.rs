//! Get methods must take a request message named after the method.
//!
//! # Rationale
//!
//! A consistent `Get<Resource>Request` name makes generated clients
//! predictable and leaves room to add request fields later.
//!
//! # Good Patterns
//!
//! ```proto
//! rpc GetBook(GetBookRequest) returns (Book);
//! ```

use aep_lint_core::descriptor::simple_name;
use aep_lint_core::{DeclarationKind, ProtoFile, RawProblem, Rule};

/// Rule name for request-message-name.
pub const NAME: &str = "core::0131::request-message-name";

/// Checks the request message name of standard Get methods.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestMessageName;

impl RequestMessageName {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl<F: ProtoFile + ?Sized> Rule<F> for RequestMessageName {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Get methods must have a request message named `Get<Resource>Request`"
    }

    fn lint(&self, file: &F) -> Vec<RawProblem> {
        file.methods()
            .filter(|method| crate::get_method_resource(&method.name).is_some())
            .filter_map(|method| {
                let DeclarationKind::Method { input_type, .. } = &method.kind else {
                    return None;
                };
                let want = format!("{}Request", method.name);
                let got = simple_name(input_type);
                (got != want).then(|| {
                    RawProblem::new(
                        method.full_name.clone(),
                        format!(
                            "Get RPCs should have a request message named after the RPC, \
                             such as `{want}` (found `{got}`)."
                        ),
                    )
                })
            })
            .collect()
    }
}

//! # aep-lint-rules
//!
//! Built-in AEP rules.
//!
//! Every rule is generic over [`ProtoFile`], so one implementation serves
//! both descriptor pipelines. Which rules each pipeline registers is decided
//! here.
//!
//! ## Available Rules
//!
//! | Name | Pipelines | Description |
//! |------|-----------|-------------|
//! | `core::0122::name-suffix` | legacy, native | Fields should not end in `_name` |
//! | `core::0131::request-message-name` | legacy | Get request is `Get<Resource>Request` |
//! | `core::0131::response-message-name` | legacy | Get returns the resource |
//!
//! ## Usage
//!
//! ```ignore
//! use aep_lint_core::{LegacyFile, RuleRegistry};
//!
//! let mut registry = RuleRegistry::<LegacyFile>::new();
//! aep_lint_rules::add_legacy_rules(&mut registry)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod name_suffix;
mod request_message_name;
mod response_message_name;

pub use name_suffix::NameSuffix;
pub use request_message_name::RequestMessageName;
pub use response_message_name::ResponseMessageName;

use aep_lint_core::{ProtoFile, RegistryError, RuleBox, RuleRegistry};

/// Re-export core types for convenience.
pub use aep_lint_core::{RawProblem, Rule};

/// Resource name of a standard Get method: `GetBook` → `Book`.
///
/// `Get` must be followed by an uppercase letter, so `Getaway` is not one.
pub(crate) fn get_method_resource(method: &str) -> Option<&str> {
    let resource = method.strip_prefix("Get")?;
    resource
        .starts_with(|c: char| c.is_ascii_uppercase())
        .then_some(resource)
}

/// Rules run by the legacy pipeline.
#[must_use]
pub fn legacy_rules<F: ProtoFile + 'static>() -> Vec<RuleBox<F>> {
    vec![
        Box::new(RequestMessageName::new()),
        Box::new(ResponseMessageName::new()),
        Box::new(NameSuffix::new()),
    ]
}

/// Rules run by the native pipeline.
#[must_use]
pub fn native_rules<F: ProtoFile + 'static>() -> Vec<RuleBox<F>> {
    vec![Box::new(NameSuffix::new())]
}

/// Registers the legacy pipeline's rules.
///
/// # Errors
///
/// Returns [`RegistryError`] if a name is taken; nothing is registered then.
pub fn add_legacy_rules<F: ProtoFile + 'static>(
    registry: &mut RuleRegistry<F>,
) -> Result<(), RegistryError> {
    registry.register_all(legacy_rules())
}

/// Registers the native pipeline's rules.
///
/// # Errors
///
/// Returns [`RegistryError`] if a name is taken; nothing is registered then.
pub fn add_native_rules<F: ProtoFile + 'static>(
    registry: &mut RuleRegistry<F>,
) -> Result<(), RegistryError> {
    registry.register_all(native_rules())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aep_lint_core::{LegacyFile, NativeFile};

    #[test]
    fn get_method_needs_uppercase_resource() {
        assert_eq!(get_method_resource("GetBook"), Some("Book"));
        assert_eq!(get_method_resource("Getaway"), None);
        assert_eq!(get_method_resource("Getter"), None);
        assert_eq!(get_method_resource("Get"), None);
        assert_eq!(get_method_resource("ListBooks"), None);
    }

    #[test]
    fn add_rules_succeeds_once() {
        let mut legacy = RuleRegistry::<LegacyFile>::new();
        add_legacy_rules(&mut legacy).unwrap();
        assert_eq!(legacy.len(), 3);
        assert!(matches!(
            add_legacy_rules(&mut legacy),
            Err(RegistryError::DuplicateName(_))
        ));
        assert_eq!(legacy.len(), 3);

        let mut native = RuleRegistry::<NativeFile>::new();
        add_native_rules(&mut native).unwrap();
        let names: Vec<String> = native.names().map(ToString::to_string).collect();
        assert_eq!(names, vec!["core::0122::name-suffix"]);
    }
}

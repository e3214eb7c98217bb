//! Translation of rule names into plugin-host check identifiers.
//!
//! `core::0131::request-message-name` becomes `AEP_0131_REQUEST_MESSAGE_NAME`
//! in categories `AEP` and `AEP_CORE`.

use crate::rule_name::RuleName;
use serde::Serialize;
use std::collections::HashMap;

/// Category every check belongs to.
pub const AEP_CATEGORY_ID: &str = "AEP";

/// Check description as exposed to a plugin host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckSpec {
    /// Host-side identifier.
    pub id: String,
    /// Host-side categories.
    pub category_ids: Vec<String>,
    /// One-line purpose.
    pub purpose: String,
    /// The rule this check runs.
    pub rule: RuleName,
}

/// Two different rules normalize to the same check id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
#[error("Rules `{first}` and `{second}` both map to check id `{id}`")]
#[diagnostic(code(aep_lint::plugin::check_id_collision))]
pub struct CheckIdCollision {
    /// The shared id.
    pub id: String,
    /// Rule registered first.
    pub first: RuleName,
    /// Rule that collided.
    pub second: RuleName,
}

fn normalize(segment: &str) -> String {
    segment.replace('-', "_").to_ascii_uppercase()
}

/// Builds the check spec of one rule.
#[must_use]
pub fn check_spec(rule: &RuleName) -> CheckSpec {
    CheckSpec {
        id: format!("AEP_{}_{}", normalize(rule.group()), normalize(rule.name())),
        category_ids: vec![
            AEP_CATEGORY_ID.to_string(),
            format!("{AEP_CATEGORY_ID}_{}", normalize(rule.category())),
        ],
        purpose: format!("Checks AEP rule {rule}."),
        rule: rule.clone(),
    }
}

/// Builds check specs for a set of rule names, in first-seen order.
///
/// The same rule name appearing more than once (e.g. registered in both
/// pipelines) yields one spec.
///
/// # Errors
///
/// Returns [`CheckIdCollision`] if two distinct names share an id.
pub fn check_specs<'a>(
    rules: impl IntoIterator<Item = &'a RuleName>,
) -> Result<Vec<CheckSpec>, CheckIdCollision> {
    let mut specs: Vec<CheckSpec> = Vec::new();
    let mut by_id: HashMap<String, usize> = HashMap::new();
    for rule in rules {
        let spec = check_spec(rule);
        match by_id.get(&spec.id) {
            Some(&i) if specs[i].rule == *rule => {}
            Some(&i) => {
                return Err(CheckIdCollision {
                    id: spec.id,
                    first: specs[i].rule.clone(),
                    second: rule.clone(),
                })
            }
            None => {
                by_id.insert(spec.id.clone(), specs.len());
                specs.push(spec);
            }
        }
    }
    Ok(specs)
}

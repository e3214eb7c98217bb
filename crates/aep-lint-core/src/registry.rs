//! Rule registry: validated names mapped to rule implementations.

use crate::rule::{Rule, RuleBox};
use crate::rule_name::{NameError, RuleName};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Errors from registering rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
pub enum RegistryError {
    /// A rule name does not have three valid segments.
    #[error("Invalid rule name: {0}")]
    #[diagnostic(
        code(aep_lint::registry::invalid_name),
        help("rule names look like `core::0131::request-message-name`")
    )]
    InvalidName(#[from] NameError),

    /// A rule name is already taken.
    #[error("Rule `{0}` is already registered")]
    #[diagnostic(code(aep_lint::registry::duplicate_name))]
    DuplicateName(RuleName),
}

/// A rule together with its parsed name.
pub struct RegisteredRule<F: ?Sized> {
    name: RuleName,
    rule: RuleBox<F>,
}

impl<F: ?Sized> RegisteredRule<F> {
    /// The validated rule name.
    #[must_use]
    pub fn name(&self) -> &RuleName {
        &self.name
    }

    /// The rule implementation.
    #[must_use]
    pub fn rule(&self) -> &dyn Rule<F> {
        self.rule.as_ref()
    }

    /// The rule's description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        self.rule.description()
    }
}

impl<F: ?Sized> fmt::Debug for RegisteredRule<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredRule")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Rules of one pipeline, in registration order.
///
/// Build it once at startup and share it read-only for the whole run.
pub struct RuleRegistry<F: ?Sized> {
    rules: Vec<RegisteredRule<F>>,
    by_name: HashMap<RuleName, usize>,
}

impl<F: ?Sized> Default for RuleRegistry<F> {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            by_name: HashMap::new(),
        }
    }
}

impl<F: ?Sized> fmt::Debug for RuleRegistry<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(RegisteredRule::name))
            .finish()
    }
}

impl<F: ?Sized> RuleRegistry<F> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one rule.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidName`] or
    /// [`RegistryError::DuplicateName`]; the registry is unchanged on error.
    pub fn register<R: Rule<F> + 'static>(&mut self, rule: R) -> Result<(), RegistryError> {
        self.register_all(vec![Box::new(rule) as RuleBox<F>])
    }

    /// Registers a batch of rules, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns the first invalid or duplicate name (including duplicates
    /// within the batch); no rule of the batch is registered on error.
    pub fn register_all(
        &mut self,
        rules: impl IntoIterator<Item = RuleBox<F>>,
    ) -> Result<(), RegistryError> {
        let mut staged = Vec::new();
        let mut seen = HashSet::new();
        for rule in rules {
            let name = RuleName::parse(rule.name())?;
            if self.by_name.contains_key(&name) || !seen.insert(name.clone()) {
                return Err(RegistryError::DuplicateName(name));
            }
            staged.push(RegisteredRule { name, rule });
        }

        for registered in staged {
            tracing::trace!("Registered rule {}", registered.name);
            self.by_name
                .insert(registered.name.clone(), self.rules.len());
            self.rules.push(registered);
        }
        Ok(())
    }

    /// Looks up a rule by name.
    #[must_use]
    pub fn lookup(&self, name: &RuleName) -> Option<&RegisteredRule<F>> {
        self.by_name.get(name).and_then(|&i| self.rules.get(i))
    }

    /// All rules in registration order.
    #[must_use]
    pub fn all(&self) -> &[RegisteredRule<F>] {
        &self.rules
    }

    /// All rule names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &RuleName> {
        self.rules.iter().map(RegisteredRule::name)
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true when no rule is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

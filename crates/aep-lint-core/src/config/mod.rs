//! Layered configuration deciding which rules run on which files.
//!
//! A [`ConfigSequence`] is an ordered list of [`ConfigLayer`]s:
//!
//! ```text
//! built-in defaults
//!   ↓ user file ([[configs]] entries, in file order)
//!   ↓ --enable-rule layer
//!   ↓ --disable-rule layer
//! ```
//!
//! Rules start enabled. Each layer that applies to a file path sets the
//! state from its longest matching rule prefix; later layers win.

use crate::rule_name::{longest_match, NameError, RuleName, RuleNamePrefix, RuleState};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub mod dto;
pub mod loader;

pub use loader::ConfigFormat;

/// Configuration errors. Any of these aborts a run before linting starts.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    #[diagnostic(code(aep_lint::config::io))]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Syntax error or unknown field in config file.
    #[error("Failed to parse config: {message}")]
    #[diagnostic(
        code(aep_lint::config::parse),
        help("known layer fields: included_paths, excluded_paths, enabled_rules, disabled_rules")
    )]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// A rule prefix is malformed.
    #[error("{context}: {source}")]
    #[diagnostic(
        code(aep_lint::config::invalid_prefix),
        help("rule prefixes look like `core`, `core::0131`, or `core::0131::request-message-name`")
    )]
    InvalidPrefix {
        /// Where the prefix appeared (e.g. "configs[0].disabled_rules[1]").
        context: String,
        /// Why it was rejected.
        source: NameError,
    },

    /// A path pattern is malformed.
    #[error("{context}: invalid glob pattern `{pattern}`: {reason}")]
    #[diagnostic(code(aep_lint::config::invalid_glob))]
    InvalidGlob {
        /// Where the pattern appeared.
        context: String,
        /// The rejected pattern.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The same prefix is both enabled and disabled within one layer.
    #[error("{context}: `{prefix}` is both enabled and disabled")]
    #[diagnostic(
        code(aep_lint::config::conflicting_prefix),
        help("move one of the entries to a separate layer; later layers take precedence")
    )]
    ConflictingPrefix {
        /// Layer that holds the conflict.
        context: String,
        /// The prefix listed in both places.
        prefix: String,
    },
}

/// A validated glob pattern over `/`-separated file paths.
///
/// `*` stays within one path segment; `**` spans segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobPattern {
    raw: String,
    compiled: glob::Pattern,
}

impl GlobPattern {
    const OPTIONS: glob::MatchOptions = glob::MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    /// Compiles a pattern.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason if the pattern is empty or invalid.
    pub fn new(pattern: &str) -> Result<Self, String> {
        if pattern.is_empty() {
            return Err("pattern is empty".to_string());
        }
        let compiled = glob::Pattern::new(pattern).map_err(|e| e.to_string())?;
        Ok(Self {
            raw: pattern.to_string(),
            compiled,
        })
    }

    /// Tests whether a file path matches.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.compiled.matches_with(path, Self::OPTIONS)
    }

    /// Returns the pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// One configuration layer.
///
/// Build with [`ConfigLayerBuilder`]; construction rejects invalid globs,
/// invalid prefixes, and prefixes listed as both enabled and disabled.
#[derive(Debug, Clone, Default)]
pub struct ConfigLayer {
    included_paths: Vec<GlobPattern>,
    excluded_paths: Vec<GlobPattern>,
    enabled_rules: BTreeSet<RuleNamePrefix>,
    disabled_rules: BTreeSet<RuleNamePrefix>,
}

impl ConfigLayer {
    /// Creates a builder.
    #[must_use]
    pub fn builder() -> ConfigLayerBuilder {
        ConfigLayerBuilder::new()
    }

    /// Whether this layer applies to `path`.
    #[must_use]
    pub fn applies_to(&self, path: &str) -> bool {
        let included =
            self.included_paths.is_empty() || self.included_paths.iter().any(|p| p.matches(path));
        included && !self.excluded_paths.iter().any(|p| p.matches(path))
    }

    /// The state this layer assigns to `rule`, if any of its prefixes match.
    #[must_use]
    pub fn decide(&self, rule: &RuleName) -> Option<RuleState> {
        let enabled = self.enabled_rules.iter().map(|p| (p, RuleState::Enabled));
        let disabled = self.disabled_rules.iter().map(|p| (p, RuleState::Disabled));
        longest_match(enabled.chain(disabled), rule)
    }

    /// Enabled prefixes.
    pub fn enabled_rules(&self) -> impl Iterator<Item = &RuleNamePrefix> {
        self.enabled_rules.iter()
    }

    /// Disabled prefixes.
    pub fn disabled_rules(&self) -> impl Iterator<Item = &RuleNamePrefix> {
        self.disabled_rules.iter()
    }
}

/// Builder for [`ConfigLayer`].
#[derive(Debug, Clone, Default)]
pub struct ConfigLayerBuilder {
    context: Option<String>,
    included_paths: Vec<String>,
    excluded_paths: Vec<String>,
    enabled_rules: Vec<String>,
    disabled_rules: Vec<String>,
}

impl ConfigLayerBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Names the layer in error messages.
    #[must_use]
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Restricts the layer to paths matching `pattern`.
    #[must_use]
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.included_paths.push(pattern.into());
        self
    }

    /// Adds several include patterns.
    #[must_use]
    pub fn include_all<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.included_paths
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Skips the layer for paths matching `pattern`.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.excluded_paths.push(pattern.into());
        self
    }

    /// Adds several exclude patterns.
    #[must_use]
    pub fn exclude_all<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_paths
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Enables rules under `prefix`.
    #[must_use]
    pub fn enable(mut self, prefix: impl Into<String>) -> Self {
        self.enabled_rules.push(prefix.into());
        self
    }

    /// Enables rules under several prefixes.
    #[must_use]
    pub fn enable_all<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enabled_rules.extend(prefixes.into_iter().map(Into::into));
        self
    }

    /// Disables rules under `prefix`.
    #[must_use]
    pub fn disable(mut self, prefix: impl Into<String>) -> Self {
        self.disabled_rules.push(prefix.into());
        self
    }

    /// Disables rules under several prefixes.
    #[must_use]
    pub fn disable_all<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disabled_rules
            .extend(prefixes.into_iter().map(Into::into));
        self
    }

    /// Validates and builds the layer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidGlob`], [`ConfigError::InvalidPrefix`],
    /// or [`ConfigError::ConflictingPrefix`].
    pub fn build(self) -> Result<ConfigLayer, ConfigError> {
        let ctx = self.context.unwrap_or_else(|| "config".to_string());

        let globs = |field: &str, patterns: Vec<String>| {
            patterns
                .into_iter()
                .enumerate()
                .map(|(i, p)| {
                    GlobPattern::new(&p).map_err(|reason| ConfigError::InvalidGlob {
                        context: format!("{ctx}.{field}[{i}]"),
                        pattern: p.clone(),
                        reason,
                    })
                })
                .collect::<Result<Vec<_>, _>>()
        };
        let prefixes = |field: &str, raw: Vec<String>| {
            raw.into_iter()
                .enumerate()
                .map(|(i, p)| {
                    RuleNamePrefix::parse(&p).map_err(|e| ConfigError::InvalidPrefix {
                        context: format!("{ctx}.{field}[{i}]"),
                        source: e,
                    })
                })
                .collect::<Result<BTreeSet<_>, _>>()
        };

        let included_paths = globs("included_paths", self.included_paths)?;
        let excluded_paths = globs("excluded_paths", self.excluded_paths)?;
        let enabled_rules = prefixes("enabled_rules", self.enabled_rules)?;
        let disabled_rules = prefixes("disabled_rules", self.disabled_rules)?;

        // Two matching prefixes of equal length are necessarily identical.
        if let Some(conflict) = enabled_rules.intersection(&disabled_rules).next() {
            return Err(ConfigError::ConflictingPrefix {
                context: ctx,
                prefix: conflict.to_string(),
            });
        }

        Ok(ConfigLayer {
            included_paths,
            excluded_paths,
            enabled_rules,
            disabled_rules,
        })
    }
}

/// Ordered configuration layers; later layers take precedence.
#[derive(Debug, Clone, Default)]
pub struct ConfigSequence {
    layers: Vec<ConfigLayer>,
}

impl ConfigSequence {
    /// Creates an empty sequence (every rule enabled everywhere).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sequence holding the built-in default layer.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut sequence = Self::new();
        sequence.push(ConfigLayer::default());
        sequence
    }

    /// Appends a layer.
    pub fn push(&mut self, layer: ConfigLayer) {
        self.layers.push(layer);
    }

    /// Appends the layers of a configuration file.
    ///
    /// # Errors
    ///
    /// Returns the loader's error; nothing is appended on failure.
    pub fn with_file(mut self, path: &Path) -> Result<Self, ConfigError> {
        let layers = loader::load_file(path)?;
        tracing::debug!("Loaded {} config layer(s) from {}", layers.len(), path.display());
        self.layers.extend(layers);
        Ok(self)
    }

    /// Appends the command-line override layers: enables first, then disables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPrefix`] for a malformed prefix.
    pub fn with_overrides(
        mut self,
        enabled: &[String],
        disabled: &[String],
    ) -> Result<Self, ConfigError> {
        let enable_layer = ConfigLayer::builder()
            .context("--enable-rule")
            .enable_all(enabled.iter().cloned())
            .build()?;
        let disable_layer = ConfigLayer::builder()
            .context("--disable-rule")
            .disable_all(disabled.iter().cloned())
            .build()?;
        self.layers.push(enable_layer);
        self.layers.push(disable_layer);
        Ok(self)
    }

    /// Layers in precedence order.
    #[must_use]
    pub fn layers(&self) -> &[ConfigLayer] {
        &self.layers
    }

    /// Decides whether `rule` runs on the file at `path`.
    #[must_use]
    pub fn is_enabled(&self, path: &str, rule: &RuleName) -> bool {
        let state = self
            .layers
            .iter()
            .filter(|layer| layer.applies_to(path))
            .filter_map(|layer| layer.decide(rule))
            .last()
            .unwrap_or(RuleState::Enabled);
        state == RuleState::Enabled
    }
}

impl FromIterator<ConfigLayer> for ConfigSequence {
    fn from_iter<I: IntoIterator<Item = ConfigLayer>>(iter: I) -> Self {
        Self {
            layers: iter.into_iter().collect(),
        }
    }
}

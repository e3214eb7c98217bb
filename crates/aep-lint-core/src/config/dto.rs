//! Configuration file deserialization types (DTO layer).
//!
//! These types exist solely for serde deserialization.
//! They are converted to [`ConfigLayer`](super::ConfigLayer)s by the loader.

use serde::Deserialize;

/// Raw TOML representation of a configuration file.
///
/// ```toml
/// [[configs]]
/// included_paths = ["v2/*.proto"]
/// disabled_rules = ["core::0131"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileDto {
    /// Layers in precedence order.
    #[serde(default)]
    pub configs: Vec<ConfigLayerDto>,
}

/// Raw representation of one configuration layer.
///
/// JSON configuration files are a top-level array of these.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayerDto {
    /// Glob patterns the layer is restricted to.
    #[serde(default)]
    pub included_paths: Vec<String>,
    /// Glob patterns the layer never applies to.
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// Rule-name prefixes to enable.
    #[serde(default)]
    pub enabled_rules: Vec<String>,
    /// Rule-name prefixes to disable.
    #[serde(default)]
    pub disabled_rules: Vec<String>,
}

//! DTO → [`ConfigLayer`] conversion with validation.

use super::dto::{ConfigFileDto, ConfigLayerDto};
use super::{ConfigError, ConfigLayer, ConfigLayerBuilder};
use std::path::Path;

/// Supported configuration file syntaxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `[[configs]]` tables.
    Toml,
    /// A top-level array of layer objects.
    Json,
}

impl ConfigFormat {
    /// Picks the format from a file extension; anything but `.json` is TOML.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Toml,
        }
    }
}

/// Reads and validates configuration layers from a file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, does not parse, or contains
/// an invalid glob, an invalid rule prefix, or a conflicting prefix.
pub fn load_file(path: &Path) -> Result<Vec<ConfigLayer>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse(&content, ConfigFormat::from_path(path))
}

/// Parses and validates configuration layers from text.
///
/// # Errors
///
/// See [`load_file`].
pub fn parse(content: &str, format: ConfigFormat) -> Result<Vec<ConfigLayer>, ConfigError> {
    let dtos = match format {
        ConfigFormat::Toml => {
            toml::from_str::<ConfigFileDto>(content)
                .map_err(|e| ConfigError::Parse {
                    message: e.to_string(),
                })?
                .configs
        }
        ConfigFormat::Json => {
            serde_json::from_str::<Vec<ConfigLayerDto>>(content).map_err(|e| {
                ConfigError::Parse {
                    message: e.to_string(),
                }
            })?
        }
    };

    dtos.into_iter()
        .enumerate()
        .map(|(i, dto)| convert_layer(dto, i))
        .collect()
}

fn convert_layer(dto: ConfigLayerDto, index: usize) -> Result<ConfigLayer, ConfigError> {
    ConfigLayerBuilder::new()
        .context(format!("configs[{index}]"))
        .include_all(dto.included_paths)
        .exclude_all(dto.excluded_paths)
        .enable_all(dto.enabled_rules)
        .disable_all(dto.disabled_rules)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule_name::RuleName;

    fn rule(s: &str) -> RuleName {
        RuleName::parse(s).unwrap()
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("a.JSON")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("a.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("config")), ConfigFormat::Toml);
    }

    #[test]
    fn parses_toml_layers() {
        let layers = parse(
            r#"
[[configs]]
included_paths = ["v2/*.proto"]
disabled_rules = ["core"]
"#,
            ConfigFormat::Toml,
        )
        .unwrap();
        assert_eq!(layers.len(), 1);
        assert!(layers[0].applies_to("v2/book.proto"));
        assert!(!layers[0].applies_to("v1/book.proto"));
    }

    #[test]
    fn parses_json_layers() {
        let layers = parse(
            r#"[{"disabled_rules": ["core::0131"]}, {"enabled_rules": ["core::0131::request-message-name"]}]"#,
            ConfigFormat::Json,
        )
        .unwrap();
        assert_eq!(layers.len(), 2);
        assert!(layers[1]
            .decide(&rule("core::0131::request-message-name"))
            .is_some());
    }

    #[test]
    fn invalid_prefix_names_the_layer() {
        let err = parse(
            r#"
[[configs]]

[[configs]]
disabled_rules = ["Core"]
"#,
            ConfigFormat::Toml,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPrefix { .. }));
        assert!(err.to_string().contains("configs[1].disabled_rules[0]"));
    }

    #[test]
    fn syntax_error_is_parse_error() {
        let err = parse("[[configs]\n", ConfigFormat::Toml).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        let err = parse("{}", ConfigFormat::Json).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_file(Path::new("/nonexistent/aep-lint.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}

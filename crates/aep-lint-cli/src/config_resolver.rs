//! Locating the configuration file for a run.
//!
//! Resolution order:
//!
//! 1. `--config` flag
//! 2. `aep-lint.toml`, `.aep-lint.toml` or `aep-lint.json` in the working directory
//! 3. `config.toml` in the global directory (`$AEP_LINT_CONFIG_DIR` or `~/.aep-lint/`)
//! 4. Built-in defaults only

use aep_lint::{ConfigError, ConfigSequence};
use std::path::{Path, PathBuf};

/// Where the configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Found next to the sources being linted.
    Project(PathBuf),
    /// Found in the global config directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// The configuration file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Builds the layer sequence: defaults, then this file's layers.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or is invalid.
    pub fn load(&self) -> Result<ConfigSequence, ConfigError> {
        let base = ConfigSequence::with_defaults();
        match self {
            Self::Default => Ok(base),
            Self::Global(p) => {
                tracing::info!("Using global config: {}", p.display());
                base.with_file(p)
            }
            Self::Explicit(p) | Self::Project(p) => base.with_file(p),
        }
    }
}

const PROJECT_CONFIG_NAMES: &[&str] = &["aep-lint.toml", ".aep-lint.toml", "aep-lint.json"];

const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Environment variable overriding the global config directory.
pub const CONFIG_DIR_ENV: &str = "AEP_LINT_CONFIG_DIR";

/// Resolves the configuration for a run started in `project_dir`.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_inner(project_dir, explicit, global_config_dir())
}

fn resolve_inner(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    if let Some(found) = PROJECT_CONFIG_NAMES
        .iter()
        .map(|name| project_dir.join(name))
        .find(|candidate| candidate.is_file())
    {
        tracing::debug!("Found project config: {}", found.display());
        return ConfigSource::Project(found);
    }

    match global_dir.map(|dir| dir.join(GLOBAL_CONFIG_NAME)) {
        Some(candidate) if candidate.is_file() => {
            tracing::debug!("Found global config: {}", candidate.display());
            ConfigSource::Global(candidate)
        }
        _ => ConfigSource::Default,
    }
}

/// `$AEP_LINT_CONFIG_DIR`, else `~/.aep-lint/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".aep-lint"))
}

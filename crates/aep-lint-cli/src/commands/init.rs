//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const CONFIG_FILE_NAME: &str = "aep-lint.toml";

const DEFAULT_CONFIG: &str = r#"# aep-lint configuration
#
# Layers are applied in order; for each rule and file the last layer that
# mentions the rule decides. Rule prefixes address whole categories
# ("core"), groups ("core::0131") or single rules.

[[configs]]
# Glob patterns restricting where this layer applies (empty: everywhere)
included_paths = []
# Glob patterns this layer never applies to
excluded_paths = ["google/**/*.proto"]
enabled_rules = []
disabled_rules = []

# [[configs]]
# included_paths = ["legacy/**/*.proto"]
# disabled_rules = ["core::0122"]
"#;

/// Runs the init command, writing the starter config into `dir`.
pub fn run(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)?;

    println!("Created {CONFIG_FILE_NAME}");
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE_NAME} to configure rules");
    println!("  2. Run: aep-lint check --descriptor-set-in <set.json>");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aep_lint::{ConfigSequence, RuleName};
    use tempfile::TempDir;

    #[test]
    fn starter_config_loads() {
        let tmp = TempDir::new().unwrap();
        run(tmp.path(), false).unwrap();

        let configs = ConfigSequence::with_defaults()
            .with_file(&tmp.path().join(CONFIG_FILE_NAME))
            .unwrap();
        let rule: RuleName = "core::0122::name-suffix".parse().unwrap();
        assert!(configs.is_enabled("acme/v1/book.proto", &rule));
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "# mine\n").unwrap();

        assert!(run(tmp.path(), false).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine\n");

        run(tmp.path(), true).unwrap();
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .starts_with("# aep-lint configuration"));
    }
}

//! List rules command implementation.

use anyhow::Result;
use aep_lint::{ConfigSequence, DualPipeline, RuleInfo};

use crate::OutputFormat;

/// Runs the list-rules command.
pub fn run(format: OutputFormat) -> Result<()> {
    let pipeline = DualPipeline::with_builtin_rules(ConfigSequence::with_defaults())?;
    let rules = pipeline.rules()?;
    print!("{}", render(&rules, format)?);
    Ok(())
}

fn render(rules: &[RuleInfo], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        let mut json = serde_json::to_string_pretty(rules)?;
        json.push('\n');
        return Ok(json);
    }

    let mut out = String::from("Available rules:\n\n");
    out.push_str(&format!(
        "{:<38} {:<16} {:<34} Description\n",
        "Name", "Pipelines", "Check ID"
    ));
    out.push_str(&"-".repeat(110));
    out.push('\n');

    for rule in rules {
        let pipelines = rule
            .pipelines
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&format!(
            "{:<38} {:<16} {:<34} {}\n",
            rule.name.to_string(),
            pipelines,
            rule.check_id,
            rule.description
        ));
    }

    out.push_str("\nDisable a rule or a whole group by prefix, e.g.:\n");
    out.push_str("  aep-lint check --disable-rule core::0131 ...\n");
    out.push_str("  // (-- api-linter: core::0122::name-suffix=disabled --)\n");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> Vec<RuleInfo> {
        DualPipeline::with_builtin_rules(ConfigSequence::with_defaults())
            .unwrap()
            .rules()
            .unwrap()
    }

    #[test]
    fn text_table_shows_pipelines_and_check_ids() {
        let text = render(&rules(), OutputFormat::Text).unwrap();
        let suffix = text
            .lines()
            .find(|l| l.starts_with("core::0122::name-suffix"))
            .unwrap();
        assert!(suffix.contains("legacy,native"));
        assert!(suffix.contains("AEP_0122_NAME_SUFFIX"));
    }

    #[test]
    fn json_lists_uris() {
        let json = render(&rules(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(3));
        assert_eq!(
            value[0]["uri"],
            "https://linter.aep.dev/0131/request-message-name"
        );
    }
}

//! Rendering lint results.

use anyhow::{Context, Result};
use aep_lint::{CombinedResult, Pipeline};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use crate::OutputFormat;

/// Renders `results` and writes them to `path`, or stdout when `None`.
pub fn write(results: &[CombinedResult], format: OutputFormat, path: Option<&Path>) -> Result<()> {
    let rendered = render(results, format)?;
    match path {
        Some(p) => std::fs::write(p, rendered)
            .with_context(|| format!("Failed to write output to {}", p.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}

/// Renders `results` in `format`.
pub fn render(results: &[CombinedResult], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(results)),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(results)?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Github => Ok(render_github(results)),
        OutputFormat::Summary => Ok(render_summary(results)),
    }
}

fn render_text(results: &[CombinedResult]) -> String {
    let mut out = String::new();
    for result in results.iter().filter(|r| r.has_problems()) {
        for pipeline in [Pipeline::Legacy, Pipeline::Native] {
            for problem in result.problems(pipeline) {
                out.push_str(&format!("[{pipeline}] "));
                out.push_str(&problem.format(&result.file_path));
                out.push('\n');
            }
        }
    }

    let files = results.iter().filter(|r| r.has_problems()).count();
    let problems: usize = results.iter().map(CombinedResult::problem_count).sum();
    out.push_str(&format!(
        "Found {problems} problem(s) in {files} of {} file(s)\n",
        results.len()
    ));
    out
}

/// One `::error` workflow command per problem.
fn render_github(results: &[CombinedResult]) -> String {
    let mut out = String::new();
    for result in results {
        for pipeline in [Pipeline::Legacy, Pipeline::Native] {
            for problem in result.problems(pipeline) {
                let mut props = format!("file={}", escape_property(&result.file_path));
                if let Some(loc) = problem.location {
                    props.push_str(&format!(
                        ",line={},col={},endLine={}",
                        loc.line, loc.column, loc.end_line
                    ));
                }
                props.push_str(&format!(
                    ",title={}",
                    escape_property(&format!("{} ({pipeline})", problem.rule_id))
                ));
                out.push_str(&format!(
                    "::error {props}::{}\n",
                    escape_data(&problem.message)
                ));
            }
        }
    }
    out
}

fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}

fn render_summary(results: &[CombinedResult]) -> String {
    let mut counts: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for result in results {
        for problem in &result.legacy {
            counts.entry(problem.rule_id.to_string()).or_default().0 += 1;
        }
        for problem in &result.native {
            counts.entry(problem.rule_id.to_string()).or_default().1 += 1;
        }
    }

    let mut out = format!("{:<40} {:>7} {:>7}\n", "Rule", "legacy", "native");
    out.push_str(&"-".repeat(56));
    out.push('\n');
    for (rule, (legacy, native)) in &counts {
        out.push_str(&format!("{rule:<40} {legacy:>7} {native:>7}\n"));
    }
    let files = results.iter().filter(|r| r.has_problems()).count();
    out.push_str(&format!(
        "{} file(s) linted, {files} with problems\n",
        results.len()
    ));
    out
}

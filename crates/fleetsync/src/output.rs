//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders workflow outcomes in the format selected by `--output`. Table
//! uses `tabled`, structured formats use serde, plain emits one line per
//! outcome.

use std::io::{self, Write};

use tabled::settings::Style;
use tabled::{Table, Tabled};

use fleetsync_core::{BatchReport, HostOutcome};

use crate::cli::OutputFormat;
use crate::error::CliError;

// ── Rows ─────────────────────────────────────────────────────────────

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Host ID")]
    hostid: String,
    #[tabled(rename = "Changed")]
    changed: String,
    #[tabled(rename = "Message")]
    message: String,
}

impl From<&HostOutcome> for OutcomeRow {
    fn from(o: &HostOutcome) -> Self {
        Self {
            action: o.action.to_string(),
            hostid: o.hostid.as_ref().map(ToString::to_string).unwrap_or_default(),
            changed: o
                .diff
                .as_ref()
                .map(|d| d.changed_fields().join(", "))
                .unwrap_or_default(),
            message: o.message.clone(),
        }
    }
}

#[derive(Tabled)]
struct FailureRow {
    #[tabled(rename = "Record")]
    index: usize,
    #[tabled(rename = "Error")]
    error: String,
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render one workflow outcome.
pub fn render_outcome(format: OutputFormat, outcome: &HostOutcome) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => Ok(render_table(&[OutcomeRow::from(outcome)])),
        OutputFormat::Plain => Ok(outcome.message.clone()),
        _ => render_structured(format, outcome),
    }
}

/// Render a batch report: its outcomes, any failures, then the summary.
pub fn render_report(format: OutputFormat, report: &BatchReport) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => {
            let mut out = String::new();
            if !report.outcomes.is_empty() {
                let rows: Vec<OutcomeRow> = report.outcomes.iter().map(OutcomeRow::from).collect();
                out.push_str(&render_table(&rows));
                out.push('\n');
            }
            if !report.failures.is_empty() {
                let rows: Vec<FailureRow> = report
                    .failures
                    .iter()
                    .map(|f| FailureRow {
                        index: f.index,
                        error: f.error.clone(),
                    })
                    .collect();
                out.push_str(&render_table(&rows));
                out.push('\n');
            }
            out.push_str(&report.message);
            Ok(out)
        }
        OutputFormat::Plain => {
            let mut lines: Vec<&str> = report.outcomes.iter().map(|o| o.message.as_str()).collect();
            lines.push(&report.message);
            Ok(lines.join("\n"))
        }
        _ => render_structured(format, report),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_structured<T: serde::Serialize + ?Sized>(
    format: OutputFormat,
    data: &T,
) -> Result<String, CliError> {
    let rendered = match format {
        OutputFormat::JsonCompact => serde_json::to_string(data).map_err(render_error)?,
        OutputFormat::Yaml => serde_yaml::to_string(data).map_err(render_error)?,
        _ => serde_json::to_string_pretty(data).map_err(render_error)?,
    };
    Ok(rendered)
}

fn render_error(e: impl std::fmt::Display) -> CliError {
    CliError::Render {
        message: e.to_string(),
    }
}

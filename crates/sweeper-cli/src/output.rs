//! Report rendering.

use std::fmt::Write as _;

use anyhow::{Context, Result};

use sweeper_core::{DeletionStatus, SweepReport};

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
}

/// Render `report` in `format`.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render(report: &SweepReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => {
            serde_json::to_string_pretty(report).context("Failed to serialize report")
        }
    }
}

fn render_text(report: &SweepReport) -> String {
    let mut out = String::new();

    for outcome in &report.outcomes {
        let artifact = &outcome.artifact;
        let label = match &outcome.status {
            DeletionStatus::Deleted => "deleted".to_string(),
            DeletionStatus::DryRunSkipped => "would delete".to_string(),
            DeletionStatus::DeleteFailed(reason) => format!("failed ({reason})"),
        };
        let _ = writeln!(
            out,
            "{label:<14} {name}  id={id} size={size} created={created}",
            name = artifact.name,
            id = artifact.id.get(),
            size = artifact.size_in_bytes,
            created = artifact.created_at.format("%Y-%m-%dT%H:%M:%SZ"),
        );
    }

    let mode = if report.dry_run { " (dry run)" } else { "" };
    let _ = write!(
        out,
        "pages: {}, evaluated: {}, matched: {}, deleted: {}, skipped: {}, failed: {}, reclaimed: {} bytes{mode}",
        report.pages_fetched,
        report.evaluated,
        report.retained,
        report.deleted(),
        report.skipped(),
        report.failed(),
        report.reclaimed_bytes(),
    );
    out
}

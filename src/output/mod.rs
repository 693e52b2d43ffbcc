//! Output module for rendering audit results
//!
//! Reports can be rendered as markdown for people or JSON for other tools,
//! and written either to a file or to stdout.

mod markdown;
mod narrative;

pub use markdown::{format_audit_markdown, format_comparison_markdown};
pub use narrative::{NarrativeGenerator, TemplateNarrative};

use crate::audit::{AuditReport, ComparisonReport};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Rendering format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

/// Renders an audit report in the requested format
pub fn render_report(report: &AuditReport, format: OutputFormat) -> OutputResult<String> {
    match format {
        OutputFormat::Markdown => Ok(format_audit_markdown(report)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}

/// Renders a comparison in the requested format
pub fn render_comparison(
    comparison: &ComparisonReport,
    format: OutputFormat,
) -> OutputResult<String> {
    match format {
        OutputFormat::Markdown => Ok(format_comparison_markdown(comparison)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(comparison)?),
    }
}

/// Writes rendered output to `path`, or to stdout when no path is given
pub fn write_output(path: Option<&Path>, content: &str) -> OutputResult<()> {
    match path {
        Some(path) => {
            let mut file = File::create(path)?;
            file.write_all(content.as_bytes())?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                handle.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}

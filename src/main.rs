//! seo-audit main entry point
//!
//! This is the command-line interface for the seo-audit engine.

use anyhow::Context;
use clap::Parser;
use seo_audit::config::{load_config_with_hash, Config};
use seo_audit::output::{
    render_comparison, render_report, write_output, NarrativeGenerator, OutputFormat,
    TemplateNarrative,
};
use seo_audit::storage::{open_store, AuditStore};
use seo_audit::{AuditReport, Auditor};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// seo-audit: a single-page SEO audit engine
///
/// Fetches the given page, runs every analyzer against it and prints a
/// scored report with a severity-sorted issue list.
#[derive(Parser, Debug)]
#[command(name = "seo-audit")]
#[command(version = "1.0.0")]
#[command(about = "Audit a web page for SEO problems", long_about = None)]
struct Cli {
    /// URL to audit; `https://` is assumed when no scheme is given
    #[arg(value_name = "URL")]
    url: String,

    /// Also audit a competitor and print a head-to-head comparison
    #[arg(long, value_name = "URL")]
    compare: Option<String>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
    format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// SQLite database to save the audit to (overrides the config file)
    #[arg(long, value_name = "PATH", requires = "client_id")]
    database: Option<PathBuf>,

    /// Client the saved audit belongs to
    #[arg(long, value_name = "ID")]
    client_id: Option<i64>,

    /// Append a prioritized action plan to a markdown report
    #[arg(long)]
    narrative: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load_configuration(cli.config.as_deref())?;
    let database = cli
        .database
        .clone()
        .or_else(|| config.output.database_path.as_ref().map(PathBuf::from));

    let auditor = Auditor::new(&cli.url, config.clone())
        .with_context(|| format!("Cannot audit {}", cli.url))?;
    let report = auditor.full_audit().await;

    tracing::info!(
        "Audit of {} finished: score {}/100, grade {}",
        report.url,
        report.overall_score,
        report.grade
    );

    if let (Some(path), Some(client_id)) = (database.as_deref(), cli.client_id) {
        save_report(path, client_id, &report)?;
    } else if database.is_some() {
        tracing::warn!("No --client-id given; audit not saved");
    }

    let mut rendered = render_report(&report, cli.format)?;
    if cli.narrative {
        if cli.format == OutputFormat::Markdown {
            rendered.push('\n');
            rendered.push_str(&TemplateNarrative::default().generate(&report.url, &report));
        } else {
            tracing::warn!("--narrative only applies to markdown output");
        }
    }

    if let Some(competitor_url) = &cli.compare {
        let comparison = auditor
            .compare_with_competitor(&report, competitor_url)
            .await
            .with_context(|| format!("Cannot compare against {}", competitor_url))?;
        tracing::info!(
            "Comparison finished: {} of {} metrics won",
            comparison.wins(),
            comparison.comparison.len()
        );

        let table = render_comparison(&comparison, cli.format)?;
        rendered = match cli.format {
            OutputFormat::Markdown => format!("{}\n{}", rendered, table),
            OutputFormat::Json => format!("{{\"report\":{},\"comparison\":{}}}", rendered, table),
        };
    }

    write_output(cli.output.as_deref(), &rendered)?;
    if let Some(path) = &cli.output {
        tracing::info!("Report written to {}", path.display());
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("seo_audit=info,warn"),
            1 => EnvFilter::new("seo_audit=debug,info"),
            2 => EnvFilter::new("seo_audit=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so stdout carries only the report
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn load_configuration(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::debug!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

fn save_report(path: &Path, client_id: i64, report: &AuditReport) -> anyhow::Result<()> {
    let mut store = open_store(path)
        .with_context(|| format!("Failed to open audit database {}", path.display()))?;
    let id = store.save_audit(client_id, report)?;
    tracing::info!(
        "Saved audit #{} for client {} to {}",
        id,
        client_id,
        path.display()
    );
    Ok(())
}

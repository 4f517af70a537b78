//! pubmed-pharma - PubMed papers with pharmaceutical/biotech affiliations
//!
//! ## Usage
//!
//! ```bash
//! pubmed-pharma "cancer treatment"
//! pubmed-pharma "COVID-19 vaccine" --file results.csv
//! pubmed-pharma "drug development" --debug
//! ```

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use pubmed_pharma::classifier::AffiliationClassifier;
use pubmed_pharma::config;
use pubmed_pharma::pipeline::{self, PipelineOutcome, WriteStatus};
use pubmed_pharma::pubmed::{
    ClientConfig, PubmedClient, DEFAULT_BATCH_SIZE, DEFAULT_MAX_RESULTS,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Fetch research papers from PubMed and identify those with
/// pharmaceutical/biotech company affiliations.
#[derive(Parser)]
#[command(name = "pubmed-pharma")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Search query for PubMed
    query: String,

    /// Output CSV filename
    #[arg(short, long, default_value = "pubmed_results.csv")]
    file: PathBuf,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Maximum number of search results
    #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_RESULTS)]
    max_results: usize,

    /// PMIDs per fetch request
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Pause between fetch requests, in milliseconds
    #[arg(long, default_value_t = 500)]
    delay_ms: u64,

    /// TOML file extending or replacing the company keyword list
    #[arg(long)]
    keywords: Option<PathBuf>,

    /// NCBI API key
    #[arg(long, env = "NCBI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Contact email reported to NCBI
    #[arg(long, env = "NCBI_EMAIL")]
    email: Option<String>,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Diagnostics go to stderr; stdout carries the summary only.
    let log_level = if cli.debug { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,pubmed_pharma={}", log_level)));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(cli.debug)
        .with_thread_ids(false)
        .init();

    debug!(query = %cli.query, "Query");
    debug!(file = %cli.file.display(), "Output file");

    let reference = match config::load_reference_set(cli.keywords.as_deref()) {
        Ok(reference) => reference,
        Err(e) => Cli::command()
            .error(ErrorKind::InvalidValue, format!("--keywords: {}", e))
            .exit(),
    };

    let client_config = ClientConfig {
        max_results: cli.max_results,
        batch_size: cli.batch_size,
        batch_delay: Duration::from_millis(cli.delay_ms),
        api_key: cli.api_key.clone(),
        email: cli.email.clone(),
        ..Default::default()
    };
    if let Err(e) = client_config.validate() {
        Cli::command().error(ErrorKind::ValueValidation, e).exit();
    }

    let client = PubmedClient::new(client_config, AffiliationClassifier::new(reference))
        .context("Failed to create PubMed client")?;

    let outcome = pipeline::run(&client, &cli.query, &cli.file).await;
    report(&outcome);
    Ok(ExitCode::from(outcome.exit_status()))
}

// ============================================================================
// Reporting
// ============================================================================

fn report(outcome: &PipelineOutcome) {
    match outcome {
        PipelineOutcome::NoIdentifiers => eprintln!("No papers found for the given query."),
        PipelineOutcome::NoRecords { .. } => eprintln!("No paper details could be retrieved."),
        PipelineOutcome::Completed(summary) => {
            println!("Found {} total papers", summary.total);
            println!(
                "Found {} papers with pharmaceutical/biotech affiliations",
                summary.flagged
            );
            match &summary.write {
                WriteStatus::Written(path) => println!("Results written to {}", path.display()),
                WriteStatus::Empty => eprintln!("No papers to write to CSV."),
                // Already logged by the pipeline.
                WriteStatus::Failed(_) => {}
            }
        }
    }
}

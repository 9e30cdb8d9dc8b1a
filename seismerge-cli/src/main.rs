//! Seismerge CLI — reconciliation run and check commands.
//!
//! Commands:
//! - `run` — execute the full pipeline and replace the training table
//! - `check` — reconcile without writing and print what a run would persist

use anyhow::Result;
use clap::{Parser, Subcommand};
use seismerge_runner::{check, run, PipelineConfig, RunSummary};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "seismerge.toml";

#[derive(Parser)]
#[command(
    name = "seismerge",
    about = "Seismerge CLI — reconciles price series and the seismic event log into one training table"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute the full pipeline and replace the training table.
    Run {
        /// Path to a TOML config file. Without it, ./seismerge.toml is used
        /// when present, production defaults otherwise.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the run summary as JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Dry run: reconcile and summarize without touching the database.
    Check {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the run summary as JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, json } => {
            let config = load_config(config.as_deref())?;
            let summary = run(&config)?;
            report(&summary, json)
        }
        Commands::Check { config, json } => {
            let config = load_config(config.as_deref())?;
            let summary = check(&config)?;
            report(&summary, json)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => Ok(PipelineConfig::from_file(path)?),
        None if Path::new(DEFAULT_CONFIG).exists() => {
            Ok(PipelineConfig::from_file(Path::new(DEFAULT_CONFIG))?)
        }
        None => Ok(PipelineConfig::default()),
    }
}

fn report(summary: &RunSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        print_summary(summary);
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("=== Reconciliation Run ===");
    println!("Event file:     {}", summary.event_file);
    println!(
        "Event rows:     {} ({} days)",
        summary.event_rows, summary.event_days
    );
    println!(
        "Instruments:    {} loaded, {} skipped",
        summary.loaded.len(),
        summary.skipped.len()
    );
    for (instrument, rows) in &summary.loaded {
        println!("  {instrument:<8} {rows} rows");
    }
    for (instrument, reason) in &summary.skipped {
        println!("  {instrument:<8} SKIPPED: {reason}");
    }
    println!("Output rows:    {}", summary.output_rows);
    println!("Price columns:  {}", summary.price_columns);
    println!("Fingerprint:    {}", summary.dataset_hash);
    println!(
        "Persisted:      {}",
        if summary.persisted { "yes" } else { "no (dry run)" }
    );
    if let Some(reason) = &summary.event_error {
        println!();
        println!("WARNING: event file contributed no rows: {reason}");
    }
    println!();
}

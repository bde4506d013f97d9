//! Humanbench CLI - Ground-truth alignment and statistic standardization.
//!
//! # Usage
//!
//! ```bash
//! # Align materials in ./ground_truth.json + ./materials/
//! hb align
//! hb align --study-dir studies/anchoring --dry-run
//! hb align --json -v
//!
//! # Standardize a batch of agent/human comparisons
//! hb standardize comparisons.json
//!
//! # Show help
//! hb --help
//! ```

mod align;
mod config;
mod output;
mod standardize;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use humanbench_core::StandardizerRegistry;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Humanbench alignment and standardization CLI.
///
/// Links generated material items to ground-truth statistics and converts
/// agent/human statistic pairs into standardized distances.
#[derive(Parser)]
#[command(name = "hb", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Output results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging (-v for info, -vv for debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Write ground-truth keys into material files and check coverage
    Align(AlignArgs),
    /// Compute standardized distances for a JSON file of comparisons
    Standardize(StandardizeArgs),
}

#[derive(Args)]
pub(crate) struct AlignArgs {
    /// Study directory holding ground_truth.json and materials/
    /// (default: $HUMANBENCH_STUDY_DIR, then the current directory)
    #[arg(long)]
    study_dir: Option<PathBuf>,

    /// Ground-truth file (overrides <study-dir>/ground_truth.json)
    #[arg(long)]
    ground_truth: Option<PathBuf>,

    /// Materials directory (overrides <study-dir>/materials)
    #[arg(long)]
    materials_dir: Option<PathBuf>,

    /// Compute the report without writing material files
    #[arg(long)]
    dry_run: bool,

    /// Maximum tolerated missing rate relative to labeled items
    #[arg(long)]
    max_missing_items: Option<f64>,

    /// Maximum tolerated missing rate relative to available keys
    #[arg(long)]
    max_missing_keys: Option<f64>,
}

#[derive(Args)]
struct StandardizeArgs {
    /// JSON array of {"comparison_id"?, "agent", "human"} objects
    file: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Command::Align(args) => {
            let run = align::execute_align(args)?;

            let output = if cli.json {
                output::format_align_json(&run)
            } else {
                output::format_align_human(&run)
            };
            println!("{}", output);

            if let Some(err) = &run.policy_error {
                eprintln!("Error: {}", err);
                std::process::exit(1);
            }
        }
        Command::Standardize(args) => {
            let registry = StandardizerRegistry::with_builtins();
            let results = standardize::execute_standardize(&args.file, &registry)?;

            let output = if cli.json {
                output::format_standardize_json(&results)
            } else {
                output::format_standardize_human(&results)
            };
            println!("{}", output);

            let failed = results.iter().filter(|r| r.result.is_err()).count();
            if failed > 0 {
                eprintln!("Error: {} of {} comparisons failed", failed, results.len());
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

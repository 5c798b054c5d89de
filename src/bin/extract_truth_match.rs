//! Compute per-event truth matchings and write them as CSV.
//!
//! ```bash
//! extract_truth_match --dbname=events --table_name=truth_match_inputs \
//!     --output_fname=truth_match.csv
//! extract_truth_match truth_match.cfg
//! ```
//!
//! With the `parallel-io` feature (on by default), events are matched by a
//! worker pool; pass `--sequential` to force one-at-a-time processing.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use decaymatch::config::{ConfigMap, SOURCE_KEYS};
use decaymatch::runner::{self, RunStats, TRUTH_MATCH_COLUMNS};
use decaymatch::source::{self, RecordSource};

/// Truth-match extraction.
#[derive(Debug, Parser)]
#[command(name = "extract_truth_match", version, about)]
struct Cli {
    /// `name = value` configuration file; flags take precedence.
    config_file: Option<PathBuf>,

    /// Database name for the PostgreSQL store.
    #[arg(long)]
    dbname: Option<String>,

    /// Table containing the truth-match inputs.
    #[arg(long)]
    table_name: Option<String>,

    /// Output CSV file.
    #[arg(long)]
    output_fname: Option<PathBuf>,

    /// Rows per cursor fetch.
    #[arg(long)]
    cursor_fetch_size: Option<u32>,

    /// Read records from this CSV file instead of a database.
    #[arg(long)]
    input_csv: Option<PathBuf>,

    /// Process events one at a time instead of with a worker pool.
    #[arg(long)]
    sequential: bool,
}

fn main() {
    init_tracing();
    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut allowed = vec!["output_fname"];
    allowed.extend_from_slice(SOURCE_KEYS);
    let mut config = ConfigMap::load(cli.config_file.as_deref(), &allowed)?;
    config
        .set_override("dbname", cli.dbname)
        .set_override("table_name", cli.table_name)
        .set_override("cursor_fetch_size", cli.cursor_fetch_size)
        .set_override("input_csv", cli.input_csv.map(|p| p.display().to_string()))
        .set_override(
            "output_fname",
            cli.output_fname.map(|p| p.display().to_string()),
        );

    let output_fname = config.require("output_fname")?;
    let out = File::create(output_fname)
        .with_context(|| format!("creating {output_fname}"))?;

    let mut src = source::open(&config.source_options()?, TRUTH_MATCH_COLUMNS)?;
    let stats = run_extraction(src.as_mut(), out, cli.sequential)?;
    src.close()?;

    println!("processed {} rows.", stats.read);
    Ok(())
}

#[cfg(feature = "parallel-io")]
fn run_extraction(src: &mut dyn RecordSource, out: File, sequential: bool) -> Result<RunStats> {
    if sequential {
        runner::extract_truth_match(src, out)
    } else {
        runner::extract_truth_match_par(src, out, None)
    }
}

#[cfg(not(feature = "parallel-io"))]
fn run_extraction(src: &mut dyn RecordSource, out: File, _sequential: bool) -> Result<RunStats> {
    runner::extract_truth_match(src, out)
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}

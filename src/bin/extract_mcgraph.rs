//! Extract MC decay graphs from the event store into adjacency CSV form.
//!
//! ```bash
//! extract_mcgraph --dbname=events --table_name=framework_ntuples \
//!     --output_fname=mcgraph.csv
//! extract_mcgraph mcgraph.cfg            # options from a config file
//! extract_mcgraph --input_csv=dump.csv --output_fname=mcgraph.csv
//! ```

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use decaymatch::config::{ConfigMap, SOURCE_KEYS};
use decaymatch::runner::{self, MCGRAPH_COLUMNS};
use decaymatch::source::{self, RecordSource};

/// MC decay-graph extraction.
#[derive(Debug, Parser)]
#[command(name = "extract_mcgraph", version, about)]
struct Cli {
    /// `name = value` configuration file; flags take precedence.
    config_file: Option<PathBuf>,

    /// Database name for the PostgreSQL store.
    #[arg(long)]
    dbname: Option<String>,

    /// Table containing the MC graph inputs.
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

    let mut src = source::open(&config.source_options()?, MCGRAPH_COLUMNS)?;
    let stats = runner::extract_mcgraph(src.as_mut(), out)?;
    src.close()?;

    println!("processed {} rows.", stats.read);
    Ok(())
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

//! Extract reconstruction decay graphs from the event store into adjacency
//! CSV form, rewriting the per-block daughter slot arrays into globally
//! indexed edge lists.
//!
//! ```bash
//! extract_recograph --dbname=events --table_name=framework_ntuples \
//!     --output_fname=recograph.csv
//! ```

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use decaymatch::BlockRegistry;
use decaymatch::config::{ConfigMap, SOURCE_KEYS};
use decaymatch::runner::{self, recograph_columns};
use decaymatch::source::{self, RecordSource};

/// Reconstruction decay-graph extraction.
#[derive(Debug, Parser)]
#[command(name = "extract_recograph", version, about)]
struct Cli {
    /// `name = value` configuration file; flags take precedence.
    config_file: Option<PathBuf>,

    /// Database name for the PostgreSQL store.
    #[arg(long)]
    dbname: Option<String>,

    /// Table containing the reconstruction block inputs.
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

    let columns = recograph_columns(BlockRegistry::standard());
    let column_refs: Vec<&str> = columns.iter().map(String::as_str).collect();
    let mut src = source::open(&config.source_options()?, &column_refs)?;
    let stats = runner::extract_recograph(src.as_mut(), out)?;
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

//! Examine one event's truth match: write the MC graph, pruned MC graph,
//! reconstruction graph, and the matched overlay as graphviz dot files.
//!
//! ```bash
//! examine_truth_match examine.cfg
//! examine_truth_match --input_csv=truth_match_inputs.csv \
//!     --pdt_fname=pdt.dat --mcgraph_output=mc.gv \
//!     --pruned_mcgraph_output=pruned.gv --recograph_output=reco.gv \
//!     --truth_match_output=matched.gv
//! ```

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use decaymatch::config::{ConfigMap, SOURCE_KEYS};
use decaymatch::runner::{TRUTH_MATCH_COLUMNS, TruthMatchRecord};
use decaymatch::source::{self, RecordSource};
use decaymatch::{GraphEmitter, GraphSpec, NameLabel, ParticleTable, TruthMatcher};

/// Per-event truth-match examination.
#[derive(Debug, Parser)]
#[command(name = "examine_truth_match", version, about)]
struct Cli {
    /// `name = value` configuration file; flags take precedence.
    config_file: Option<PathBuf>,

    /// Database name for the PostgreSQL store.
    #[arg(long)]
    dbname: Option<String>,

    /// Table containing the truth-match inputs.
    #[arg(long)]
    table_name: Option<String>,

    /// Rows per cursor fetch.
    #[arg(long)]
    cursor_fetch_size: Option<u32>,

    /// Read records from this CSV file instead of a database.
    #[arg(long)]
    input_csv: Option<PathBuf>,

    /// Particle name lookup table.
    #[arg(long)]
    pdt_fname: Option<PathBuf>,

    /// Output file for the MC graph.
    #[arg(long)]
    mcgraph_output: Option<PathBuf>,

    /// Output file for the pruned MC graph.
    #[arg(long)]
    pruned_mcgraph_output: Option<PathBuf>,

    /// Output file for the reconstruction graph.
    #[arg(long)]
    recograph_output: Option<PathBuf>,

    /// Output file for the truth-match overlay.
    #[arg(long)]
    truth_match_output: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut allowed = vec![
        "pdt_fname",
        "mcgraph_output",
        "pruned_mcgraph_output",
        "recograph_output",
        "truth_match_output",
    ];
    allowed.extend_from_slice(SOURCE_KEYS);
    let mut config = ConfigMap::load(cli.config_file.as_deref(), &allowed)?;
    config
        .set_override("dbname", cli.dbname)
        .set_override("table_name", cli.table_name)
        .set_override("cursor_fetch_size", cli.cursor_fetch_size)
        .set_override("input_csv", cli.input_csv.map(|p| p.display().to_string()))
        .set_override("pdt_fname", cli.pdt_fname.map(|p| p.display().to_string()))
        .set_override(
            "mcgraph_output",
            cli.mcgraph_output.map(|p| p.display().to_string()),
        )
        .set_override(
            "pruned_mcgraph_output",
            cli.pruned_mcgraph_output.map(|p| p.display().to_string()),
        )
        .set_override(
            "recograph_output",
            cli.recograph_output.map(|p| p.display().to_string()),
        )
        .set_override(
            "truth_match_output",
            cli.truth_match_output.map(|p| p.display().to_string()),
        );

    let pdt = ParticleTable::load(config.require("pdt_fname")?)
        .context("loading the particle name table")?;

    // read the first record and compute its matching
    let mut src = source::open(&config.source_options()?, TRUTH_MATCH_COLUMNS)?;
    if !src.next()? {
        bail!("the input contains no records");
    }
    let record = TruthMatchRecord::read(src.as_ref())?;
    src.close()?;

    let matcher = TruthMatcher::compute(
        GraphSpec {
            n_vertices: record.mc_n_vertices,
            from: &record.mc_from,
            to: &record.mc_to,
            lund_id: &record.mc_lund,
        },
        GraphSpec {
            n_vertices: record.reco_n_vertices,
            from: &record.reco_from,
            to: &record.reco_to,
            lund_id: &record.reco_lund,
        },
        &record.seeds,
    )?;

    let labels = NameLabel(&pdt);

    let mut mc_emitter = GraphEmitter::new();
    mc_emitter.set_vertex_attr("color", "blue");
    write_graph(&config, "mcgraph_output", |out| {
        mc_emitter.emit(out, matcher.mc_graph(), &labels, None)
    })?;
    write_graph(&config, "pruned_mcgraph_output", |out| {
        mc_emitter.emit(out, matcher.pruned_mc().graph(), &labels, None)
    })?;

    let mut reco_emitter = GraphEmitter::new();
    reco_emitter.set_vertex_attr("color", "red");
    write_graph(&config, "recograph_output", |out| {
        reco_emitter.emit(out, matcher.reco_graph(), &labels, None)
    })?;

    let match_emitter = GraphEmitter::truth_match_defaults();
    write_graph(&config, "truth_match_output", |out| {
        match_emitter.emit(out, matcher.reco_graph(), &labels, Some(matcher.matching()))
    })?;

    Ok(())
}

fn write_graph(
    config: &ConfigMap,
    key: &str,
    emit: impl FnOnce(&mut BufWriter<File>) -> decaymatch::Result<()>,
) -> Result<()> {
    let path = config.require(key)?;
    let mut out =
        BufWriter::new(File::create(path).with_context(|| format!("creating {path}"))?);
    emit(&mut out).with_context(|| format!("writing {path}"))?;
    Ok(())
}

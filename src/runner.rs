//! Per-record orchestration for the extraction tools.
//!
//! Each runner drains a [`RecordSource`] and writes one output CSV row per
//! event: decode the record, run the event's pipeline, encode the results.
//! A failure inside an event is logged with its id and the event is skipped;
//! iteration continues. Events with a saturated reconstruction block are a
//! known upstream defect and are dropped without a message.

use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::assembler::EdgeAssembler;
use crate::blocks::{BlockIndex, BlockRegistry};
use crate::builder::{assemble_reco, mc_adjacency};
use crate::error::Error;
use crate::matcher::{GraphSpec, MatchSeeds, TruthMatcher};
use crate::pgarray::{decode_array, decode_scalar, encode_array};
use crate::source::RecordSource;

/// Input columns of the MC-graph extraction.
pub const MCGRAPH_COLUMNS: &[&str] = &["eid", "mclen", "daulen", "dauidx", "mclund"];

/// Input columns of the truth-match extraction.
pub const TRUTH_MATCH_COLUMNS: &[&str] = &[
    "eid",
    "mc_n_vertices",
    "mc_n_edges",
    "mc_from_vertices",
    "mc_to_vertices",
    "mc_lund_id",
    "reco_n_vertices",
    "reco_n_edges",
    "reco_from_vertices",
    "reco_to_vertices",
    "reco_lund_id",
    "h_reco_idx",
    "hmcidx",
    "l_reco_idx",
    "lmcidx",
    "gamma_reco_idx",
    "gammamcidx",
    "y_reco_idx",
];

/// Input columns of the reco-graph extraction for a given block registry.
pub fn recograph_columns(registry: &BlockRegistry) -> Vec<String> {
    let mut columns = vec!["eid".to_owned()];
    for spec in registry.specs() {
        columns.push(format!("n{}", spec.name));
        columns.push(format!("{}lund", spec.name));
        columns.push(format!("{}ndaus", spec.name));
        for k in 1..=spec.max_daughters {
            columns.push(format!("{}d{k}lund", spec.name));
            columns.push(format!("{}d{k}idx", spec.name));
        }
    }
    columns
}

/// Counters accumulated over one extraction run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunStats {
    /// Records read from the source.
    pub read: usize,
    /// Output rows written.
    pub written: usize,
    /// Events dropped by the full-block guard.
    pub skipped: usize,
    /// Events dropped by a per-event failure.
    pub failed: usize,
}

#[derive(Debug, Serialize)]
struct GraphRow {
    eid: i64,
    n_vertices: usize,
    n_edges: usize,
    from: String,
    to: String,
    lund_id: String,
}

#[derive(Debug, Serialize)]
struct TruthMatchRow {
    eid: i64,
    pruned_mc_from_vertices: String,
    pruned_mc_to_vertices: String,
    matching: String,
    y_match_status: String,
    exist_matched_y: i32,
}

/// Extract MC decay graphs into adjacency CSV form.
///
/// # Errors
/// Fails on source transport and output write errors only; per-event
/// failures are logged and skipped.
pub fn extract_mcgraph<W: Write>(source: &mut dyn RecordSource, out: W) -> Result<RunStats> {
    let mut writer = csv::Writer::from_writer(out);
    let mut stats = RunStats::default();

    while source.next()? {
        stats.read += 1;
        match mcgraph_row(source) {
            Ok(row) => {
                writer.serialize(row).context("writing output row")?;
                stats.written += 1;
            }
            Err(e) => {
                stats.failed += 1;
                let eid = source.get("eid").unwrap_or("?");
                tracing::warn!(eid, error = %e, "skipping event");
            }
        }
    }
    writer.flush().context("flushing output")?;
    Ok(stats)
}

fn mcgraph_row(source: &dyn RecordSource) -> Result<GraphRow, Error> {
    let eid = field_scalar(source, "eid")?;
    let mclen: usize = field_scalar(source, "mclen")?;
    let daulen = field_array(source, "daulen")?;
    let dauidx = field_array(source, "dauidx")?;
    let mclund = field_array(source, "mclund")?;
    if mclund.len() != mclen {
        return Err(Error::Shape(format!(
            "{} lund ids for {mclen} vertices",
            mclund.len()
        )));
    }

    let (from, to) = mc_adjacency(mclen, &daulen, &dauidx)?;
    Ok(GraphRow {
        eid,
        n_vertices: mclen,
        n_edges: from.len(),
        from: encode_array(&from),
        to: encode_array(&to),
        lund_id: encode_array(&mclund),
    })
}

/// Extract reconstruction decay graphs into adjacency CSV form.
///
/// # Errors
/// Fails on source transport and output write errors only; per-event
/// failures are logged and skipped.
pub fn extract_recograph<W: Write>(source: &mut dyn RecordSource, out: W) -> Result<RunStats> {
    let registry = BlockRegistry::standard();
    let mut index = registry.indexer()?;
    let mut assemblers: Vec<EdgeAssembler> = registry
        .specs()
        .iter()
        .map(|s| EdgeAssembler::new(s.capacity, s.max_daughters))
        .collect();

    let mut writer = csv::Writer::from_writer(out);
    let mut header = vec![
        "eid".to_owned(),
        "n_vertices".to_owned(),
        "n_edges".to_owned(),
        "from".to_owned(),
        "to".to_owned(),
        "lund_id".to_owned(),
    ];
    header.extend(registry.specs().iter().map(|s| format!("{}_reco_idx", s.name)));
    writer.write_record(&header).context("writing header")?;

    let mut stats = RunStats::default();
    while source.next()? {
        stats.read += 1;
        match recograph_row(source, registry, &mut index, &mut assemblers) {
            Ok(Some(row)) => {
                writer.write_record(&row).context("writing output row")?;
                stats.written += 1;
            }
            Ok(None) => stats.skipped += 1,
            Err(e) => {
                stats.failed += 1;
                let eid = source.get("eid").unwrap_or("?");
                tracing::warn!(eid, error = %e, "skipping event");
            }
        }
    }
    writer.flush().context("flushing output")?;
    Ok(stats)
}

/// Decode one event's block arrays and assemble the adjacency row.
///
/// Returns `None` when the full-block guard drops the event.
fn recograph_row(
    source: &dyn RecordSource,
    registry: &BlockRegistry,
    index: &mut BlockIndex,
    assemblers: &mut [EdgeAssembler],
) -> Result<Option<Vec<String>>, Error> {
    let eid: i64 = field_scalar(source, "eid")?;

    let mut sizes = Vec::with_capacity(registry.specs().len());
    for (spec, assembler) in registry.specs().iter().zip(assemblers.iter_mut()) {
        let n: usize = field_scalar(source, &format!("n{}", spec.name))?;
        let lund = field_array(source, &format!("{}lund", spec.name))?;
        let ndaus_raw = field_array(source, &format!("{}ndaus", spec.name))?;

        // only the first n entries of each per-candidate array are meaningful
        let lund = lund.get(..n).ok_or_else(|| {
            Error::Shape(format!("{}lund has {} entries for n={n}", spec.name, lund.len()))
        })?;
        let ndaus_raw = ndaus_raw.get(..n).ok_or_else(|| {
            Error::Shape(format!(
                "{}ndaus has {} entries for n={n}",
                spec.name,
                ndaus_raw.len()
            ))
        })?;
        let ndaus = ndaus_raw
            .iter()
            .map(|&d| {
                usize::try_from(d)
                    .map_err(|_| Error::Range(format!("negative daughter count {d}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut daulund_slots = Vec::with_capacity(spec.max_daughters);
        let mut dauidx_slots = Vec::with_capacity(spec.max_daughters);
        for k in 1..=spec.max_daughters {
            daulund_slots.push(field_array(source, &format!("{}d{k}lund", spec.name))?);
            dauidx_slots.push(field_array(source, &format!("{}d{k}idx", spec.name))?);
        }

        assembler.associate(n, lund, &ndaus, &daulund_slots, &dauidx_slots)?;
        sizes.push(n);
    }
    index.set_sizes(&sizes)?;

    // the upstream tuple producer is unreliable once a block saturates
    if index.any_full() {
        return Ok(None);
    }

    let assembly = assemble_reco(registry, index, assemblers)?;
    let mut row = vec![
        eid.to_string(),
        assembly.n_vertices.to_string(),
        assembly.from.len().to_string(),
        encode_array(&assembly.from),
        encode_array(&assembly.to),
        encode_array(&assembly.lund_id),
    ];
    row.extend(assembly.block_global_idx.iter().map(|idx| encode_array(idx)));
    Ok(Some(row))
}

/// One decoded truth-match input record.
#[derive(Debug, Clone)]
pub struct TruthMatchRecord {
    /// Event id.
    pub eid: i64,
    /// MC vertex count.
    pub mc_n_vertices: usize,
    /// MC edge sources.
    pub mc_from: Vec<i32>,
    /// MC edge targets.
    pub mc_to: Vec<i32>,
    /// MC lund ids.
    pub mc_lund: Vec<i32>,
    /// Reconstruction vertex count.
    pub reco_n_vertices: usize,
    /// Reconstruction edge sources.
    pub reco_from: Vec<i32>,
    /// Reconstruction edge targets.
    pub reco_to: Vec<i32>,
    /// Reconstruction lund ids.
    pub reco_lund: Vec<i32>,
    /// Final-state seeds for the h, l, gamma families.
    pub seeds: MatchSeeds,
    /// Global indices of the event's y candidates.
    pub y_reco_idx: Vec<i32>,
}

impl TruthMatchRecord {
    /// Decode the current record of a source opened with
    /// [`TRUTH_MATCH_COLUMNS`].
    ///
    /// # Errors
    /// Propagates field and array decoding failures; returns
    /// [`Error::Shape`] when an edge list disagrees with its edge count.
    pub fn read(source: &dyn RecordSource) -> Result<Self, Error> {
        let eid = field_scalar(source, "eid")?;
        let mc_n_vertices = field_scalar(source, "mc_n_vertices")?;
        let mc_n_edges: usize = field_scalar(source, "mc_n_edges")?;
        let mc_from = field_array(source, "mc_from_vertices")?;
        let mc_to = field_array(source, "mc_to_vertices")?;
        let mc_lund = field_array(source, "mc_lund_id")?;
        let reco_n_vertices = field_scalar(source, "reco_n_vertices")?;
        let reco_n_edges: usize = field_scalar(source, "reco_n_edges")?;
        let reco_from = field_array(source, "reco_from_vertices")?;
        let reco_to = field_array(source, "reco_to_vertices")?;
        let reco_lund = field_array(source, "reco_lund_id")?;

        for (label, list, expected) in [
            ("mc_from_vertices", &mc_from, mc_n_edges),
            ("mc_to_vertices", &mc_to, mc_n_edges),
            ("reco_from_vertices", &reco_from, reco_n_edges),
            ("reco_to_vertices", &reco_to, reco_n_edges),
        ] {
            if list.len() != expected {
                return Err(Error::Shape(format!(
                    "{label} has {} entries for {expected} edges",
                    list.len()
                )));
            }
        }

        let seeds = MatchSeeds {
            reco_idx: vec![
                field_array(source, "h_reco_idx")?,
                field_array(source, "l_reco_idx")?,
                field_array(source, "gamma_reco_idx")?,
            ],
            matched_idx: vec![
                field_array(source, "hmcidx")?,
                field_array(source, "lmcidx")?,
                field_array(source, "gammamcidx")?,
            ],
        };
        let y_reco_idx = field_array(source, "y_reco_idx")?;

        Ok(Self {
            eid,
            mc_n_vertices,
            mc_from,
            mc_to,
            mc_lund,
            reco_n_vertices,
            reco_from,
            reco_to,
            reco_lund,
            seeds,
            y_reco_idx,
        })
    }
}

fn truth_match_row(record: &TruthMatchRecord) -> Result<TruthMatchRow, Error> {
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

    let (pruned_from, pruned_to) = matcher.pruned_mc().edge_indices()?;
    let matching = matcher.matching();

    let mut y_match_status = vec![-1; record.y_reco_idx.len()];
    let mut exist_matched_y = 0;
    for (status, &y) in y_match_status.iter_mut().zip(&record.y_reco_idx) {
        let matched = usize::try_from(y)
            .ok()
            .and_then(|y| matching.get(y))
            .ok_or_else(|| {
                Error::Range(format!(
                    "y candidate index {y} outside the reconstruction graph"
                ))
            })?;
        if *matched >= 0 {
            *status = 1;
            exist_matched_y = 1;
        }
    }

    Ok(TruthMatchRow {
        eid: record.eid,
        pruned_mc_from_vertices: encode_array(&pruned_from),
        pruned_mc_to_vertices: encode_array(&pruned_to),
        matching: encode_array(matching),
        y_match_status: encode_array(&y_match_status),
        exist_matched_y,
    })
}

/// Extract truth matchings, one record at a time.
///
/// # Errors
/// Fails on source transport and output write errors only; per-event
/// failures are logged and skipped.
pub fn extract_truth_match<W: Write>(source: &mut dyn RecordSource, out: W) -> Result<RunStats> {
    let mut writer = csv::Writer::from_writer(out);
    let mut stats = RunStats::default();

    while source.next()? {
        stats.read += 1;
        match TruthMatchRecord::read(source).and_then(|r| truth_match_row(&r)) {
            Ok(row) => {
                writer.serialize(row).context("writing output row")?;
                stats.written += 1;
            }
            Err(e) => {
                stats.failed += 1;
                let eid = source.get("eid").unwrap_or("?");
                tracing::warn!(eid, error = %e, "skipping event");
            }
        }
    }
    writer.flush().context("flushing output")?;
    Ok(stats)
}

/// Extract truth matchings with a worker pool.
///
/// Whole records are decoded off the source in batches, matched in parallel
/// with rayon, and written in input order, so the output is identical to the
/// sequential runner's.
///
/// # Errors
/// See [`extract_truth_match`].
#[cfg(feature = "parallel-io")]
pub fn extract_truth_match_par<W: Write>(
    source: &mut dyn RecordSource,
    out: W,
    batch_size: Option<usize>,
) -> Result<RunStats> {
    use rayon::prelude::*;

    let batch_size = batch_size.unwrap_or_else(|| 8 * num_cpus::get().max(1));
    let mut writer = csv::Writer::from_writer(out);
    let mut stats = RunStats::default();

    loop {
        let mut batch: Vec<(String, Result<TruthMatchRecord, Error>)> = Vec::new();
        while batch.len() < batch_size && source.next()? {
            stats.read += 1;
            let eid = source.get("eid").unwrap_or("?").to_owned();
            batch.push((eid, TruthMatchRecord::read(source)));
        }
        if batch.is_empty() {
            break;
        }

        let rows: Vec<(String, Result<TruthMatchRow, Error>)> = batch
            .into_par_iter()
            .map(|(eid, record)| (eid, record.and_then(|r| truth_match_row(&r))))
            .collect();

        for (eid, row) in rows {
            match row {
                Ok(row) => {
                    writer.serialize(row).context("writing output row")?;
                    stats.written += 1;
                }
                Err(e) => {
                    stats.failed += 1;
                    tracing::warn!(eid, error = %e, "skipping event");
                }
            }
        }
    }
    writer.flush().context("flushing output")?;
    Ok(stats)
}

fn field_scalar<T: std::str::FromStr>(
    source: &dyn RecordSource,
    field: &str,
) -> Result<T, Error> {
    decode_scalar(source.get(field)?)
}

fn field_array(source: &dyn RecordSource, field: &str) -> Result<Vec<i32>, Error> {
    decode_array(source.get(field)?)
}

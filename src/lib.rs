//! # Decaymatch
//!
//! Decay-tree graph extraction and **Monte-Carlo truth matching** for
//! particle-physics event stores.
//!
//! The upstream framework writes each event's decay trees into a relational
//! store in two awkward layouts: the reconstruction side as per-family
//! candidate blocks with fixed-width daughter slot arrays, the generator
//! side as a packed adjacency. This crate rebuilds both as directed decay
//! graphs, prunes the Monte-Carlo graph down to what a detector could in
//! principle see, and computes for every reconstructed vertex the MC vertex
//! it represents — or `-1` when no structurally consistent match exists.
//!
//! ## Pipeline
//!
//! ```text
//! RecordSource ─ pgarray ─┬─ blocks + assembler + builder ──► reco graph
//!                         └─ builder ──► mc graph ── prune ──► pruned mc graph
//!                                                  matcher ──► matching vector
//!                                                  runner  ──► CSV row / emit ──► dot text
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use decaymatch::runner::{self, TRUTH_MATCH_COLUMNS};
//! use decaymatch::source::CsvSource;
//! # fn main() -> anyhow::Result<()> {
//! let mut source = CsvSource::open("events.csv", TRUTH_MATCH_COLUMNS)?;
//! let out = std::fs::File::create("truth_match.csv")?;
//! let stats = runner::extract_truth_match(&mut source, out)?;
//! println!("processed {} rows", stats.read);
//! # Ok(())
//! # }
//! ```
//!
//! Matching a single event in memory:
//!
//! ```
//! use decaymatch::matcher::{GraphSpec, MatchSeeds, TruthMatcher};
//!
//! # fn main() -> anyhow::Result<()> {
//! // e+ e- -> Upsilon(4S); the Upsilon decays to pi+ pi-
//! let mc = GraphSpec {
//!     n_vertices: 5,
//!     from: &[0, 1, 2, 2],
//!     to: &[2, 2, 3, 4],
//!     lund_id: &[11, -11, 70553, 211, -211],
//! };
//! let reco = GraphSpec {
//!     n_vertices: 3,
//!     from: &[0, 0],
//!     to: &[1, 2],
//!     lund_id: &[70553, 211, -211],
//! };
//! let seeds = MatchSeeds {
//!     reco_idx: vec![vec![1, 2]],
//!     matched_idx: vec![vec![3, 4]],
//! };
//! let matcher = TruthMatcher::compute(mc, reco, &seeds)?;
//! assert_eq!(matcher.matching(), &[2, 3, 4]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module overview
//!
//! - [`source`] — cursor-shaped record store access (CSV; PostgreSQL behind
//!   feature `postgres`)
//! - [`pgarray`] — the store's `{1,2,3}` array wire form
//! - [`particles`] — lund-id predicates and the name lookup table
//! - [`blocks`] — block registry and global candidate numbering
//! - [`assembler`] — slot-major daughter arrays → per-mother adjacency
//! - [`graph`] — arena-backed directed decay graphs
//! - [`builder`] — graph construction from adjacency arrays
//! - [`prune`] — MC graph pruning
//! - [`matcher`] — the truth-matching algorithm
//! - [`emit`] — dot-format graph output
//! - [`config`] — `name = value` config files
//! - [`runner`] — per-record orchestration for the extraction binaries
//!
//! ## Feature flags
//!
//! - `postgres` — PostgreSQL record store backend
//! - `compression-gzip` — transparent decompression of `.gz` CSV inputs
//!   (enabled by default)
//! - `parallel-io` — batch-parallel truth matching (enabled by default)

pub mod assembler;
pub mod blocks;
pub mod builder;
pub mod config;
pub mod emit;
pub mod error;
pub mod graph;
pub mod matcher;
pub mod particles;
pub mod pgarray;
pub mod prune;
pub mod runner;
pub mod source;

// General re-exports
pub use assembler::EdgeAssembler;
pub use blocks::{BlockIndex, BlockRegistry};
pub use emit::{GraphEmitter, LabelSource, LundLabel, NameLabel};
pub use error::{Error, Result};
pub use graph::{DecayGraph, Particle, VertexId};
pub use matcher::{GraphSpec, MatchSeeds, TruthMatcher};
pub use particles::ParticleTable;
pub use prune::PrunedMc;
pub use source::{CsvSource, RecordSource};

//! Truth matching between the reconstruction graph and the pruned MC graph.
//!
//! The detector-level algorithm supplies final-state seeds: for each
//! final-state family, parallel lists of reconstruction indices and the MC
//! indices they were associated to. Matching then propagates bottom-up over
//! the reconstruction graph in postorder: a composite vertex matches exactly
//! when all of its daughters matched, their matched MC vertices share one
//! mother in the pruned MC graph, that mother carries the same lund id, and
//! its daughter multiplicity agrees. Failure to match is a valid outcome,
//! recorded as `-1`.
//!
//! Parent/daughter navigation for MC vertices happens in the pruned MC graph
//! and for reconstruction vertices in the reconstruction graph, never
//! crossed.

use std::collections::HashSet;

use crate::builder::build_graph;
use crate::error::{Error, Result};
use crate::graph::{DecayGraph, VertexId};
use crate::particles::is_final_state;
use crate::prune::PrunedMc;

/// Adjacency-form graph input, as decoded from a record.
#[derive(Debug, Clone, Copy)]
pub struct GraphSpec<'a> {
    /// Vertex count; vertices are `0..n_vertices` by event-local index.
    pub n_vertices: usize,
    /// Edge sources.
    pub from: &'a [i32],
    /// Edge targets.
    pub to: &'a [i32],
    /// Lund id per vertex.
    pub lund_id: &'a [i32],
}

/// Final-state association seeds, one entry per final-state family.
///
/// `matched_idx[k][m] < 0` means family `k`'s `m`-th candidate is unmatched.
#[derive(Debug, Clone, Default)]
pub struct MatchSeeds {
    /// Reconstruction event-local indices, per family.
    pub reco_idx: Vec<Vec<i32>>,
    /// Associated MC event-local indices, per family.
    pub matched_idx: Vec<Vec<i32>>,
}

/// One event's truth-match computation and its intermediate graphs.
#[derive(Debug, Clone)]
pub struct TruthMatcher {
    mc_graph: DecayGraph,
    reco_graph: DecayGraph,
    pruned_mc: PrunedMc,
    matching: Vec<i32>,
}

impl TruthMatcher {
    /// Build both graphs, prune the MC side, seed the final states, and
    /// compute the matching.
    ///
    /// # Errors
    /// Propagates graph construction and pruning failures; returns
    /// [`Error::Shape`] when the seed families disagree in total length and
    /// [`Error::Range`] when a seed names a reconstruction index outside the
    /// graph.
    pub fn compute(mc: GraphSpec<'_>, reco: GraphSpec<'_>, seeds: &MatchSeeds) -> Result<Self> {
        let (mc_graph, _) = build_graph(mc.n_vertices, mc.from, mc.to, mc.lund_id)?;
        let pruned_mc = PrunedMc::from_mc_graph(&mc_graph)?;

        let (mut reco_graph, reco_vmap) =
            build_graph(reco.n_vertices, reco.from, reco.to, reco.lund_id)?;
        deposit_seeds(&mut reco_graph, &reco_vmap, seeds)?;

        let matching = compute_matching(&reco_graph, &pruned_mc)?;
        Ok(Self { mc_graph, reco_graph, pruned_mc, matching })
    }

    /// The unpruned MC graph.
    pub fn mc_graph(&self) -> &DecayGraph {
        &self.mc_graph
    }

    /// The reconstruction graph, with seeded `matched_idx` attributes.
    pub fn reco_graph(&self) -> &DecayGraph {
        &self.reco_graph
    }

    /// The pruned MC graph and its index map.
    pub fn pruned_mc(&self) -> &PrunedMc {
        &self.pruned_mc
    }

    /// The matching vector: entry `i` is the pruned-MC event-local index
    /// matched to reconstruction vertex `i`, or `-1`.
    pub fn matching(&self) -> &[i32] {
        &self.matching
    }
}

/// Concatenate the seed families and write `matched_idx` attributes.
fn deposit_seeds(
    reco_graph: &mut DecayGraph,
    reco_vmap: &[VertexId],
    seeds: &MatchSeeds,
) -> Result<()> {
    let total_reco: usize = seeds.reco_idx.iter().map(Vec::len).sum();
    let total_matched: usize = seeds.matched_idx.iter().map(Vec::len).sum();
    if total_reco != total_matched {
        return Err(Error::Shape(format!(
            "{total_reco} seeded reconstruction indices but {total_matched} matched indices"
        )));
    }

    let pairs = seeds
        .reco_idx
        .iter()
        .flatten()
        .zip(seeds.matched_idx.iter().flatten());
    for (&reco_idx, &matched_idx) in pairs {
        if matched_idx < 0 {
            continue;
        }
        let v = usize::try_from(reco_idx)
            .ok()
            .and_then(|i| reco_vmap.get(i).copied())
            .ok_or_else(|| {
                Error::Range(format!(
                    "seed names reconstruction index {reco_idx} outside 0..{}",
                    reco_vmap.len()
                ))
            })?;
        reco_graph.particle_mut(v)?.matched_idx = matched_idx;
    }
    Ok(())
}

/// Postorder sweep over the reconstruction graph.
fn compute_matching(reco_graph: &DecayGraph, pruned_mc: &PrunedMc) -> Result<Vec<i32>> {
    let mut matching = vec![-1; reco_graph.n_vertices()];
    for u in postorder(reco_graph)? {
        finish_vertex(reco_graph, pruned_mc, u, &mut matching)?;
    }
    Ok(matching)
}

/// Depth-first finish order over every component, roots taken in slot order.
fn postorder(graph: &DecayGraph) -> Result<Vec<VertexId>> {
    let mut order = Vec::with_capacity(graph.n_vertices());
    let mut visited = HashSet::with_capacity(graph.n_vertices());
    for root in graph.vertices() {
        if !visited.insert(root) {
            continue;
        }
        let mut stack = vec![(root, 0usize)];
        while let Some(top) = stack.last_mut() {
            let (u, next) = *top;
            let daughters = graph.out_neighbors(u)?;
            if let Some(&v) = daughters.get(next) {
                top.1 += 1;
                if visited.insert(v) {
                    stack.push((v, 0));
                }
            } else {
                order.push(u);
                stack.pop();
            }
        }
    }
    Ok(order)
}

/// Decide the match for one reconstruction vertex, daughters already done.
fn finish_vertex(
    reco_graph: &DecayGraph,
    pruned_mc: &PrunedMc,
    u: VertexId,
    matching: &mut [i32],
) -> Result<()> {
    let p = *reco_graph.particle(u)?;

    if is_final_state(p.lund_id) {
        // a seed that did not survive pruning is dropped, not an error
        if p.matched_idx >= 0 && pruned_mc.lookup(p.matched_idx).is_some() {
            matching[p.idx as usize] = p.matched_idx;
        }
        return Ok(());
    }

    // composite case: collect the daughters' matched MC vertices
    let mut matched_daughters = Vec::new();
    for &v in reco_graph.out_neighbors(u)? {
        let m = matching[reco_graph.particle(v)?.idx as usize];
        if m < 0 {
            return Ok(());
        }
        let mc_v = pruned_mc.lookup(m).ok_or_else(|| {
            Error::GraphInvariant(format!("matched mc index {m} absent from pruned graph"))
        })?;
        matched_daughters.push(mc_v);
    }
    if matched_daughters.is_empty() {
        return Err(Error::GraphInvariant(format!(
            "composite reconstruction vertex {} has no daughters",
            p.idx
        )));
    }

    // all daughters must share one mother in the pruned MC graph
    let mc_graph = pruned_mc.graph();
    let Some(&mother) = mc_graph.in_neighbors(matched_daughters[0])?.first() else {
        return Ok(());
    };
    for &mc_v in &matched_daughters[1..] {
        if mc_graph.in_neighbors(mc_v)?.first() != Some(&mother) {
            return Ok(());
        }
    }

    // identity and multiplicity of the candidate mother
    if mc_graph.particle(mother)?.lund_id != p.lund_id {
        return Ok(());
    }
    if mc_graph.out_degree(mother)? != matched_daughters.len() {
        return Ok(());
    }

    matching[p.idx as usize] = mc_graph.particle(mother)?.idx;
    Ok(())
}

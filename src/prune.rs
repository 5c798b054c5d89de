//! MC graph pruning.
//!
//! The generator's decay tree is far finer-grained than anything the
//! detector can see. Pruning rewrites it into the matchable form in three
//! phases, each preserving the surviving vertices' event-local indices:
//!
//! 1. everything strictly downstream of a final-state particle is removed;
//! 2. the beam particles (indices 0 and 1), undetectable species, and
//!    photons hanging off unacceptable mothers are contracted out;
//! 3. an `index → vertex` map over the survivors is built for the matcher.
//!
//! Edits are two-phase throughout: traversals run over an immutable graph
//! collecting targets, then the edits are applied.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::{Error, Result};
use crate::graph::{DecayGraph, VertexId};
use crate::particles::{
    PHOTON, is_acceptable_photon_mother, is_final_state, is_undetectable_particle,
};

/// Event-local index of the decay root in the MC graph.
pub const DECAY_ROOT_IDX: i32 = 2;

/// A pruned MC graph with O(1) lookup by event-local index.
#[derive(Debug, Clone)]
pub struct PrunedMc {
    graph: DecayGraph,
    by_idx: HashMap<i32, VertexId>,
}

impl PrunedMc {
    /// Prune a copy of the MC graph.
    ///
    /// # Errors
    /// Returns [`Error::RootMissing`] when no vertex carries the decay-root
    /// index, and [`Error::GraphInvariant`] when a photon does not have
    /// exactly one mother.
    pub fn from_mc_graph(mc_graph: &DecayGraph) -> Result<Self> {
        let mut graph = mc_graph.clone();
        remove_final_state_subtrees(&mut graph)?;
        rip_irrelevant_particles(&mut graph)?;

        let mut by_idx = HashMap::with_capacity(graph.n_vertices());
        for v in graph.vertices().collect::<Vec<_>>() {
            by_idx.insert(graph.particle(v)?.idx, v);
        }
        Ok(Self { graph, by_idx })
    }

    /// The pruned graph.
    pub fn graph(&self) -> &DecayGraph {
        &self.graph
    }

    /// Look up a surviving vertex by its event-local index.
    pub fn lookup(&self, idx: i32) -> Option<VertexId> {
        self.by_idx.get(&idx).copied()
    }

    /// Edge list as `(from index, to index)` pairs, in the graph's stable
    /// edge order.
    ///
    /// # Errors
    /// Propagates vertex reads; cannot fail on a graph this type built.
    pub fn edge_indices(&self) -> Result<(Vec<i32>, Vec<i32>)> {
        let mut from = Vec::with_capacity(self.graph.n_edges());
        let mut to = Vec::with_capacity(self.graph.n_edges());
        for (u, v) in self.graph.edges() {
            from.push(self.graph.particle(u)?.idx);
            to.push(self.graph.particle(v)?.idx);
        }
        Ok((from, to))
    }
}

/// Phase 1: BFS from the decay root; daughters of final-state vertices are
/// marked with their whole subtrees and removed afterwards.
fn remove_final_state_subtrees(graph: &mut DecayGraph) -> Result<()> {
    let mut root = None;
    for v in graph.vertices() {
        if graph.particle(v)?.idx == DECAY_ROOT_IDX {
            root = Some(v);
            break;
        }
    }
    let root = root.ok_or(Error::RootMissing)?;

    let mut to_remove = Vec::new();
    let mut visited = HashSet::from([root]);
    let mut queue = VecDeque::from([root]);
    while let Some(u) = queue.pop_front() {
        if is_final_state(graph.particle(u)?.lund_id) {
            for &v in graph.out_neighbors(u)? {
                collect_subtree(graph, v, &mut to_remove)?;
            }
        } else {
            for &v in graph.out_neighbors(u)? {
                if visited.insert(v) {
                    queue.push_back(v);
                }
            }
        }
    }

    for v in to_remove {
        // subtrees hanging off distinct final states may share vertices
        if graph.contains(v) {
            graph.remove_vertex(v)?;
        }
    }
    Ok(())
}

/// Push every vertex reachable from `r` (inclusive) into `out`.
fn collect_subtree(graph: &DecayGraph, r: VertexId, out: &mut Vec<VertexId>) -> Result<()> {
    let mut visited = HashSet::from([r]);
    let mut queue = VecDeque::from([r]);
    while let Some(u) = queue.pop_front() {
        for &v in graph.out_neighbors(u)? {
            if visited.insert(v) {
                queue.push_back(v);
            }
        }
        out.push(u);
    }
    Ok(())
}

/// Phase 2: contract out the beam particles, undetectable species, and
/// photons whose unique mother is not an acceptable photon source.
fn rip_irrelevant_particles(graph: &mut DecayGraph) -> Result<()> {
    let snapshot: Vec<VertexId> = graph.vertices().collect();

    let mut to_rip = Vec::new();
    for &v in &snapshot {
        let p = *graph.particle(v)?;
        if p.idx == 0 || p.idx == 1 || is_undetectable_particle(p.lund_id) {
            to_rip.push(v);
            continue;
        }
        if p.lund_id == PHOTON {
            let mothers = graph.in_neighbors(v)?;
            if mothers.len() != 1 {
                return Err(Error::GraphInvariant(format!(
                    "photon at mc index {} has {} mothers",
                    p.idx,
                    mothers.len()
                )));
            }
            if !is_acceptable_photon_mother(graph.particle(mothers[0])?.lund_id) {
                to_rip.push(v);
            }
        }
    }

    for v in to_rip {
        graph.contract_vertex(v)?;
    }
    Ok(())
}

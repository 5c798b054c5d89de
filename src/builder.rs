//! Construction of decay graphs from adjacency arrays.
//!
//! Both graph families come out of the store as flat integer arrays. The MC
//! side ships `(n_vertices, from[], to[], lund[])` directly (or the packed
//! `mclen`/`daulen`/`dauidx` layout that [`mc_adjacency`] unpacks); the
//! reconstruction side is assembled across blocks by [`assemble_reco`], which
//! resolves each daughter's `(lund id, local index)` to a global vertex
//! index through the block registry.

use crate::assembler::EdgeAssembler;
use crate::blocks::{BlockIndex, BlockRegistry};
use crate::error::{Error, Result};
use crate::graph::{DecayGraph, Particle, VertexId};

/// Build a graph with vertices `0..n_vertices` carrying `lund_id[i]`.
///
/// Returns the graph together with the `local index → vertex` table.
///
/// # Errors
/// Returns [`Error::Shape`] when `from`/`to` differ in length, when
/// `lund_id` does not have `n_vertices` entries, or when an edge endpoint is
/// outside `[0, n_vertices)`.
pub fn build_graph(
    n_vertices: usize,
    from: &[i32],
    to: &[i32],
    lund_id: &[i32],
) -> Result<(DecayGraph, Vec<VertexId>)> {
    if from.len() != to.len() {
        return Err(Error::Shape(format!(
            "{} from-vertices but {} to-vertices",
            from.len(),
            to.len()
        )));
    }
    if lund_id.len() != n_vertices {
        return Err(Error::Shape(format!(
            "{} lund ids for {n_vertices} vertices",
            lund_id.len()
        )));
    }

    let mut graph = DecayGraph::new();
    let vmap: Vec<VertexId> = (0..n_vertices)
        .map(|i| graph.add_vertex(Particle::new(i as i32, lund_id[i])))
        .collect();

    for (&u, &v) in from.iter().zip(to) {
        let resolve = |i: i32| {
            usize::try_from(i)
                .ok()
                .filter(|&i| i < n_vertices)
                .ok_or_else(|| Error::Shape(format!("edge endpoint {i} outside 0..{n_vertices}")))
        };
        graph.add_edge(vmap[resolve(u)?], vmap[resolve(v)?])?;
    }
    Ok((graph, vmap))
}

/// Unpack the store's packed MC daughter layout into edge lists.
///
/// Vertex `i` mothers the contiguous index range
/// `[dauidx[i], dauidx[i] + daulen[i])`; non-positive `daulen`/`dauidx`
/// entries mean no daughters.
///
/// # Errors
/// Returns [`Error::Shape`] when the arrays do not cover `n_vertices`
/// entries or a daughter range leaves `[0, n_vertices)`.
pub fn mc_adjacency(
    n_vertices: usize,
    daulen: &[i32],
    dauidx: &[i32],
) -> Result<(Vec<i32>, Vec<i32>)> {
    if daulen.len() < n_vertices || dauidx.len() < n_vertices {
        return Err(Error::Shape(format!(
            "daughter arrays of length {}/{} for {n_vertices} vertices",
            daulen.len(),
            dauidx.len()
        )));
    }
    let mut from = Vec::new();
    let mut to = Vec::new();
    for i in 0..n_vertices {
        if daulen[i] <= 0 || dauidx[i] <= 0 {
            continue;
        }
        for j in dauidx[i]..dauidx[i] + daulen[i] {
            if usize::try_from(j).is_ok_and(|j| j < n_vertices) {
                from.push(i as i32);
                to.push(j);
            } else {
                return Err(Error::Shape(format!(
                    "vertex {i} claims daughter {j} outside 0..{n_vertices}"
                )));
            }
        }
    }
    Ok((from, to))
}

/// One event's reconstruction graph in adjacency form, plus the per-block
/// global index columns the extraction output carries.
#[derive(Debug, Clone)]
pub struct RecoAssembly {
    /// Total candidate count.
    pub n_vertices: usize,
    /// Edge sources (mother global indices).
    pub from: Vec<i32>,
    /// Edge targets (daughter global indices).
    pub to: Vec<i32>,
    /// Lund id per global index.
    pub lund_id: Vec<i32>,
    /// Global indices per block, in registry order.
    pub block_global_idx: Vec<Vec<i32>>,
}

/// Merge the per-block assemblers into one globally indexed adjacency.
///
/// `assemblers` must parallel the registry's block order, and `index` must
/// already carry this event's sizes.
///
/// # Errors
/// Returns [`Error::Shape`] when an assembler's mother count disagrees with
/// the indexed block size, [`Error::GraphInvariant`] when a daughter lund id
/// maps to no block, and propagates index-resolution failures.
pub fn assemble_reco(
    registry: &BlockRegistry,
    index: &BlockIndex,
    assemblers: &[EdgeAssembler],
) -> Result<RecoAssembly> {
    if assemblers.len() != registry.specs().len() {
        return Err(Error::Shape(format!(
            "{} assemblers for {} blocks",
            assemblers.len(),
            registry.specs().len()
        )));
    }

    let n_vertices = index.total();
    let mut lund_id = vec![0; n_vertices];
    let mut block_global_idx = Vec::with_capacity(assemblers.len());
    let mut from = Vec::new();
    let mut to = Vec::new();

    for (spec, assembler) in registry.specs().iter().zip(assemblers) {
        let size = index.size(spec.name)?;
        if assembler.n_mothers() != size {
            return Err(Error::Shape(format!(
                "block `{}` indexed at {size} candidates but associated with {}",
                spec.name,
                assembler.n_mothers()
            )));
        }

        let mut global_idx = Vec::with_capacity(size);
        for i in 0..size {
            let g = index.global_index(spec.name, i)?;
            lund_id[g] = assembler.mother_lund(i);
            global_idx.push(g as i32);
        }
        block_global_idx.push(global_idx);

        for i in 0..size {
            let u = index.global_index(spec.name, i)? as i32;
            for j in 0..assembler.n_daughters(i) {
                let (dau_lund, dau_idx) = assembler.daughter_info(i, j);
                let dau_block = registry.block_of(dau_lund).ok_or_else(|| {
                    Error::GraphInvariant(format!(
                        "no reconstruction block maps lund id {dau_lund}"
                    ))
                })?;
                let v = index.global_index(dau_block, dau_idx)?;
                from.push(u);
                to.push(v as i32);
            }
        }
    }

    Ok(RecoAssembly { n_vertices, from, to, lund_id, block_global_idx })
}

/// Build the reconstruction graph straight from an assembly.
///
/// # Errors
/// See [`build_graph`].
pub fn build_reco(assembly: &RecoAssembly) -> Result<(DecayGraph, Vec<VertexId>)> {
    build_graph(
        assembly.n_vertices,
        &assembly.from,
        &assembly.to,
        &assembly.lund_id,
    )
}

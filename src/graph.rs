//! Directed decay graphs over a generational slot arena.
//!
//! Pruning removes and contracts vertices while the surviving vertices keep
//! their event-local indices, so the representation favors cheap structural
//! edits: each vertex lives in an arena slot with in/out incidence lists, and
//! a [`VertexId`] carries the slot's generation so that a descriptor held
//! across a removal is detected as stale instead of silently reading whatever
//! reused the slot.
//!
//! Iteration orders (vertices in slot order, neighbors in insertion order)
//! are stable across reads, which the matcher relies on for its "first
//! in-edge" mother lookup.

use crate::error::{Error, Result};

/// Stable handle to a vertex. Invalidated by the vertex's removal only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexId {
    slot: u32,
    generation: u32,
}

/// Vertex payload.
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    /// Event-local vertex index. Survives pruning unchanged.
    pub idx: i32,
    /// Lund id.
    pub lund_id: i32,
    /// Seeded MC match for reconstruction vertices; `-1` when unset.
    pub matched_idx: i32,
}

impl Particle {
    /// A vertex payload with no seeded match.
    pub fn new(idx: i32, lund_id: i32) -> Self {
        Self { idx, lund_id, matched_idx: -1 }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    particle: Option<Particle>,
    out: Vec<VertexId>,
    inn: Vec<VertexId>,
}

/// Directed graph with mother → daughter edges.
#[derive(Debug, Clone, Default)]
pub struct DecayGraph {
    slots: Vec<Slot>,
    free: Vec<u32>,
    n_vertices: usize,
    n_edges: usize,
}

impl DecayGraph {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live vertices.
    pub fn n_vertices(&self) -> usize {
        self.n_vertices
    }

    /// Number of edges.
    pub fn n_edges(&self) -> usize {
        self.n_edges
    }

    /// True when `v` refers to a live vertex of this graph.
    pub fn contains(&self, v: VertexId) -> bool {
        self.slots
            .get(v.slot as usize)
            .is_some_and(|s| s.generation == v.generation && s.particle.is_some())
    }

    /// Insert a vertex and return its handle.
    pub fn add_vertex(&mut self, particle: Particle) -> VertexId {
        self.n_vertices += 1;
        if let Some(slot) = self.free.pop() {
            let s = &mut self.slots[slot as usize];
            s.particle = Some(particle);
            VertexId { slot, generation: s.generation }
        } else {
            let slot = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                particle: Some(particle),
                out: Vec::new(),
                inn: Vec::new(),
            });
            VertexId { slot, generation: 0 }
        }
    }

    /// Insert a mother → daughter edge. Duplicates are permitted.
    ///
    /// # Errors
    /// Returns [`Error::GraphInvariant`] when either endpoint is stale.
    pub fn add_edge(&mut self, u: VertexId, v: VertexId) -> Result<()> {
        self.check(u)?;
        self.check(v)?;
        self.slots[u.slot as usize].out.push(v);
        self.slots[v.slot as usize].inn.push(u);
        self.n_edges += 1;
        Ok(())
    }

    /// True when at least one `u → v` edge exists.
    pub fn has_edge(&self, u: VertexId, v: VertexId) -> bool {
        self.contains(u)
            && self.contains(v)
            && self.slots[u.slot as usize].out.contains(&v)
    }

    /// Read a vertex payload.
    ///
    /// # Errors
    /// Returns [`Error::GraphInvariant`] when `v` is stale.
    pub fn particle(&self, v: VertexId) -> Result<&Particle> {
        self.check(v)?;
        self.slots[v.slot as usize]
            .particle
            .as_ref()
            .ok_or_else(|| Error::GraphInvariant("stale vertex descriptor".into()))
    }

    /// Mutate a vertex payload.
    ///
    /// # Errors
    /// Returns [`Error::GraphInvariant`] when `v` is stale.
    pub fn particle_mut(&mut self, v: VertexId) -> Result<&mut Particle> {
        self.check(v)?;
        self.slots[v.slot as usize]
            .particle
            .as_mut()
            .ok_or_else(|| Error::GraphInvariant("stale vertex descriptor".into()))
    }

    /// Daughters of `v`, in edge-insertion order.
    ///
    /// # Errors
    /// Returns [`Error::GraphInvariant`] when `v` is stale.
    pub fn out_neighbors(&self, v: VertexId) -> Result<&[VertexId]> {
        self.check(v)?;
        Ok(&self.slots[v.slot as usize].out)
    }

    /// Mothers of `v`, in edge-insertion order.
    ///
    /// # Errors
    /// Returns [`Error::GraphInvariant`] when `v` is stale.
    pub fn in_neighbors(&self, v: VertexId) -> Result<&[VertexId]> {
        self.check(v)?;
        Ok(&self.slots[v.slot as usize].inn)
    }

    /// Out-degree of `v`.
    ///
    /// # Errors
    /// Returns [`Error::GraphInvariant`] when `v` is stale.
    pub fn out_degree(&self, v: VertexId) -> Result<usize> {
        Ok(self.out_neighbors(v)?.len())
    }

    /// In-degree of `v`.
    ///
    /// # Errors
    /// Returns [`Error::GraphInvariant`] when `v` is stale.
    pub fn in_degree(&self, v: VertexId) -> Result<usize> {
        Ok(self.in_neighbors(v)?.len())
    }

    /// Remove `v` and its incident edges.
    ///
    /// # Errors
    /// Returns [`Error::GraphInvariant`] when `v` is stale.
    pub fn remove_vertex(&mut self, v: VertexId) -> Result<()> {
        self.check(v)?;
        let out = std::mem::take(&mut self.slots[v.slot as usize].out);
        let inn = std::mem::take(&mut self.slots[v.slot as usize].inn);
        let self_loops = out.iter().filter(|&&w| w == v).count();
        for &w in &out {
            if w != v {
                self.slots[w.slot as usize].inn.retain(|&u| u != v);
            }
        }
        for &u in &inn {
            if u != v {
                self.slots[u.slot as usize].out.retain(|&w| w != v);
            }
        }
        self.n_edges -= out.len() + inn.len() - self_loops;

        let s = &mut self.slots[v.slot as usize];
        s.particle = None;
        s.generation = s.generation.wrapping_add(1);
        self.free.push(v.slot);
        self.n_vertices -= 1;
        Ok(())
    }

    /// Contract `v`: connect every mother of `v` to every daughter of `v`
    /// (skipping edges that already exist), then remove `v`. With no
    /// mothers this degenerates to plain removal.
    ///
    /// # Errors
    /// Returns [`Error::GraphInvariant`] when `v` is stale.
    pub fn contract_vertex(&mut self, v: VertexId) -> Result<()> {
        self.check(v)?;
        let mothers = self.slots[v.slot as usize].inn.clone();
        let daughters = self.slots[v.slot as usize].out.clone();
        for &u in &mothers {
            for &w in &daughters {
                if u != v && w != v && !self.has_edge(u, w) {
                    self.add_edge(u, w)?;
                }
            }
        }
        self.remove_vertex(v)
    }

    /// Live vertices in slot order.
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.particle.as_ref().map(|_| VertexId {
                slot: i as u32,
                generation: s.generation,
            })
        })
    }

    /// All edges as `(mother, daughter)`, grouped by mother in slot order.
    pub fn edges(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        self.vertices().flat_map(move |u| {
            self.slots[u.slot as usize].out.iter().map(move |&v| (u, v))
        })
    }

    fn check(&self, v: VertexId) -> Result<()> {
        if self.contains(v) {
            Ok(())
        } else {
            Err(Error::GraphInvariant("stale vertex descriptor".into()))
        }
    }
}

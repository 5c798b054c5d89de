//! Reconstruction block registry and global vertex numbering.
//!
//! Reconstructed candidates arrive in per-family blocks (`y`, `b`, `d`, ...),
//! each with a declared capacity and a per-event current count. [`BlockIndex`]
//! lays the blocks out contiguously in declaration order and converts
//! `(block, local index)` pairs into global vertex indices. [`BlockRegistry`]
//! is the process-wide description of the block layout and the lund-id to
//! block mapping; it must agree with the producer of the upstream records.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::{Error, Result};

/// Declaration of a single reconstruction block.
#[derive(Debug, Clone)]
pub struct BlockSpec {
    /// Block name as it appears in record column prefixes.
    pub name: &'static str,
    /// Declared candidate capacity.
    pub capacity: usize,
    /// Number of daughter slots in the upstream layout.
    pub max_daughters: usize,
}

/// Process-wide block layout and lund-id routing table.
#[derive(Debug, Clone)]
pub struct BlockRegistry {
    specs: Vec<BlockSpec>,
    lund_to_block: HashMap<i32, usize>,
}

impl BlockRegistry {
    /// The reference configuration of the upstream tuple producer.
    pub fn standard() -> &'static BlockRegistry {
        static REGISTRY: OnceLock<BlockRegistry> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            let specs = vec![
                BlockSpec { name: "y", capacity: 800, max_daughters: 2 },
                BlockSpec { name: "b", capacity: 400, max_daughters: 4 },
                BlockSpec { name: "d", capacity: 200, max_daughters: 5 },
                BlockSpec { name: "c", capacity: 100, max_daughters: 2 },
                BlockSpec { name: "h", capacity: 100, max_daughters: 2 },
                BlockSpec { name: "l", capacity: 100, max_daughters: 3 },
                BlockSpec { name: "gamma", capacity: 100, max_daughters: 0 },
            ];
            let pos: HashMap<&str, usize> =
                specs.iter().enumerate().map(|(i, s)| (s.name, i)).collect();
            let signed: &[(&str, &[i32])] = &[
                ("y", &[70553]),
                ("b", &[521, 511]),
                ("d", &[413, 423, 421, 411]),
                ("c", &[213]),
                ("h", &[321, 211]),
                ("l", &[11, 13]),
            ];
            let mut lund_to_block = HashMap::new();
            for &(name, ids) in signed {
                for &id in ids {
                    lund_to_block.insert(id, pos[name]);
                    lund_to_block.insert(-id, pos[name]);
                }
            }
            // self-conjugate species: K0_S and pi0 sit in `c`, the photon in `gamma`
            lund_to_block.insert(310, pos["c"]);
            lund_to_block.insert(111, pos["c"]);
            lund_to_block.insert(22, pos["gamma"]);
            BlockRegistry { specs, lund_to_block }
        })
    }

    /// Block declarations in layout order.
    pub fn specs(&self) -> &[BlockSpec] {
        &self.specs
    }

    /// Name of the block a lund id is routed to, if any.
    pub fn block_of(&self, lund_id: i32) -> Option<&'static str> {
        self.lund_to_block.get(&lund_id).map(|&i| self.specs[i].name)
    }

    /// Build a [`BlockIndex`] over this registry's layout.
    ///
    /// # Errors
    /// Propagates [`BlockIndex::new`] failures.
    pub fn indexer(&self) -> Result<BlockIndex> {
        let names: Vec<&str> = self.specs.iter().map(|s| s.name).collect();
        let capacities: Vec<usize> = self.specs.iter().map(|s| s.capacity).collect();
        BlockIndex::new(&names, &capacities)
    }
}

/// Contiguous global numbering over an ordered sequence of blocks.
///
/// After `set_sizes(s)`, block `k` occupies the half-open global range
/// `[start_k, start_k + s_k)` with `start_0 = 0` and
/// `start_{k+1} = start_k + s_k`.
#[derive(Debug, Clone)]
pub struct BlockIndex {
    names: Vec<String>,
    by_name: HashMap<String, usize>,
    capacity: Vec<usize>,
    size: Vec<usize>,
    start: Vec<usize>,
}

impl BlockIndex {
    /// Construct an index over the given blocks, all sizes zero.
    ///
    /// # Errors
    /// Returns [`Error::Config`] when the inputs are empty, of unequal
    /// length, or contain a duplicate name.
    pub fn new(names: &[&str], capacities: &[usize]) -> Result<Self> {
        if names.is_empty() {
            return Err(Error::Config("block index needs at least one block".into()));
        }
        if names.len() != capacities.len() {
            return Err(Error::Config(format!(
                "{} block names but {} capacities",
                names.len(),
                capacities.len()
            )));
        }
        let mut by_name = HashMap::new();
        for (i, &name) in names.iter().enumerate() {
            if by_name.insert(name.to_owned(), i).is_some() {
                return Err(Error::Config(format!("duplicate block name `{name}`")));
            }
        }
        Ok(Self {
            names: names.iter().map(|&n| n.to_owned()).collect(),
            by_name,
            capacity: capacities.to_vec(),
            size: vec![0; names.len()],
            start: vec![0; names.len()],
        })
    }

    /// Set the per-event block sizes, in declaration order.
    ///
    /// # Errors
    /// Returns [`Error::Shape`] when `sizes` does not cover every block.
    pub fn set_sizes(&mut self, sizes: &[usize]) -> Result<()> {
        if sizes.len() != self.size.len() {
            return Err(Error::Shape(format!(
                "{} sizes for {} blocks",
                sizes.len(),
                self.size.len()
            )));
        }
        self.size.copy_from_slice(sizes);
        let mut start = 0;
        for (k, &s) in sizes.iter().enumerate() {
            self.start[k] = start;
            start += s;
        }
        Ok(())
    }

    /// Total candidate count across all blocks.
    pub fn total(&self) -> usize {
        self.size.iter().sum()
    }

    /// Current global start index of a block.
    ///
    /// # Errors
    /// Returns [`Error::Config`] for a name outside the registry.
    pub fn start(&self, name: &str) -> Result<usize> {
        Ok(self.start[self.pos(name)?])
    }

    /// Current size of a block.
    ///
    /// # Errors
    /// Returns [`Error::Config`] for a name outside the registry.
    pub fn size(&self, name: &str) -> Result<usize> {
        Ok(self.size[self.pos(name)?])
    }

    /// Declared capacity of a block.
    ///
    /// # Errors
    /// Returns [`Error::Config`] for a name outside the registry.
    pub fn capacity(&self, name: &str) -> Result<usize> {
        Ok(self.capacity[self.pos(name)?])
    }

    /// Global index of local candidate `idx` within `name`.
    ///
    /// # Errors
    /// Returns [`Error::Range`] when `idx` is not below the block's current
    /// size, [`Error::Config`] for an unknown name.
    pub fn global_index(&self, name: &str, idx: usize) -> Result<usize> {
        let k = self.pos(name)?;
        if idx >= self.size[k] {
            return Err(Error::Range(format!(
                "local index {idx} in block `{name}` of size {}",
                self.size[k]
            )));
        }
        Ok(self.start[k] + idx)
    }

    /// True when any block sits at (or beyond) its declared capacity.
    pub fn any_full(&self) -> bool {
        self.size
            .iter()
            .zip(&self.capacity)
            .any(|(&s, &cap)| s >= cap)
    }

    /// Block names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    fn pos(&self, name: &str) -> Result<usize> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| Error::Config(format!("unknown block `{name}`")))
    }
}

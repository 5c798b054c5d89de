//! Particle classification predicates and the name lookup table.
//!
//! Lund ids follow the community numbering scheme: the sign distinguishes
//! particle from antiparticle, the magnitude encodes the species. The three
//! predicate sets below drive MC pruning and truth matching.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Error, Result};

/// Lund id of the photon.
pub const PHOTON: i32 = 22;

/// True when the particle is one the detector observes directly.
pub fn is_final_state(lund_id: i32) -> bool {
    matches!(lund_id.abs(), 11 | 13 | 211 | 321 | 22 | 2212 | 2112)
}

/// True when the particle leaves no detector signature at all.
pub fn is_undetectable_particle(lund_id: i32) -> bool {
    matches!(lund_id.abs(), 12 | 14 | 15 | 16 | 311)
}

/// True when a photon daughter of this particle is kept during pruning.
pub fn is_acceptable_photon_mother(lund_id: i32) -> bool {
    matches!(lund_id.abs(), 111 | 413 | 423)
}

/// Bidirectional `name <-> lund id` lookup loaded from a two-column text
/// file of `name<whitespace>id` pairs.
#[derive(Debug, Clone, Default)]
pub struct ParticleTable {
    name_to_id: HashMap<String, i32>,
    id_to_name: HashMap<i32, String>,
}

impl ParticleTable {
    /// Load the table from a file.
    ///
    /// # Errors
    /// Returns [`Error::Io`] when the file cannot be read and
    /// [`Error::NumberFormat`] when an id column is not an integer.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    /// Load the table from any buffered reader.
    ///
    /// # Errors
    /// See [`ParticleTable::load`].
    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        let mut table = Self::default();
        for line in reader.lines() {
            let line = line?;
            let mut parts = line.split_whitespace();
            let (Some(name), Some(id)) = (parts.next(), parts.next()) else {
                continue;
            };
            let id: i32 = id
                .parse()
                .map_err(|_| Error::NumberFormat(id.to_owned()))?;
            table.name_to_id.insert(name.to_owned(), id);
            table.id_to_name.insert(id, name.to_owned());
        }
        Ok(table)
    }

    /// Look up a particle name by lund id.
    pub fn name(&self, id: i32) -> Option<&str> {
        self.id_to_name.get(&id).map(String::as_str)
    }

    /// Look up a lund id by particle name.
    pub fn id(&self, name: &str) -> Option<i32> {
        self.name_to_id.get(name).copied()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.id_to_name.len()
    }

    /// True when the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.id_to_name.is_empty()
    }
}

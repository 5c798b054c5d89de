//! Daughter-slot association for a single reconstruction block.
//!
//! The upstream tuple stores daughters slot-major: for slot `j` there is one
//! capacity-length array of daughter lund ids and one of daughter local
//! indices, and mother `i`'s `j`-th daughter lives at position `i` of slot
//! `j`'s arrays. [`EdgeAssembler::associate`] turns that layout into a
//! per-mother adjacency list. The validation asymmetry is inherited from the
//! layout itself: slot lists are checked against the slot count
//! (`max_daughters`) while `mother_lund`/`ndaus` are checked against
//! `n_mothers`.

use crate::error::{Error, Result};

/// Per-block daughter adjacency, rebuilt every event.
#[derive(Debug, Clone)]
pub struct EdgeAssembler {
    max_mothers: usize,
    max_daughters: usize,
    mother_lund: Vec<i32>,
    dau_lund: Vec<Vec<i32>>,
    dau_idx: Vec<Vec<usize>>,
}

impl EdgeAssembler {
    /// An assembler for a block with the given candidate capacity and
    /// daughter slot count.
    pub fn new(max_mothers: usize, max_daughters: usize) -> Self {
        Self {
            max_mothers,
            max_daughters,
            mother_lund: Vec::new(),
            dau_lund: Vec::new(),
            dau_idx: Vec::new(),
        }
    }

    /// Rebuild the adjacency from one event's slot arrays.
    ///
    /// For mother `i`, the `j`-th daughter (`j < ndaus[i]`) is
    /// `(daulund_slots[j][i], dauidx_slots[j][i])`.
    ///
    /// # Errors
    /// - [`Error::Range`] when `n_mothers` exceeds the block capacity, a
    ///   mother claims more daughters than there are slots, or a daughter
    ///   local index is negative;
    /// - [`Error::Shape`] when `mother_lund` or `ndaus` do not have exactly
    ///   `n_mothers` entries, when the slot lists do not have exactly
    ///   `max_daughters` entries, or when a slot array is shorter than
    ///   `n_mothers`.
    pub fn associate(
        &mut self,
        n_mothers: usize,
        mother_lund: &[i32],
        ndaus: &[usize],
        daulund_slots: &[Vec<i32>],
        dauidx_slots: &[Vec<i32>],
    ) -> Result<()> {
        if n_mothers > self.max_mothers {
            return Err(Error::Range(format!(
                "{n_mothers} mothers in a block of capacity {}",
                self.max_mothers
            )));
        }
        if mother_lund.len() != n_mothers {
            return Err(Error::Shape(format!(
                "mother_lund has {} entries for {n_mothers} mothers",
                mother_lund.len()
            )));
        }
        if ndaus.len() != n_mothers {
            return Err(Error::Shape(format!(
                "ndaus has {} entries for {n_mothers} mothers",
                ndaus.len()
            )));
        }
        if daulund_slots.len() != self.max_daughters {
            return Err(Error::Shape(format!(
                "{} daughter lund slots for {} declared slots",
                daulund_slots.len(),
                self.max_daughters
            )));
        }
        if dauidx_slots.len() != self.max_daughters {
            return Err(Error::Shape(format!(
                "{} daughter index slots for {} declared slots",
                dauidx_slots.len(),
                self.max_daughters
            )));
        }
        for slot in daulund_slots.iter().chain(dauidx_slots) {
            if slot.len() < n_mothers {
                return Err(Error::Shape(format!(
                    "slot array has {} entries for {n_mothers} mothers",
                    slot.len()
                )));
            }
        }

        self.mother_lund = mother_lund.to_vec();
        self.dau_lund = vec![Vec::new(); n_mothers];
        self.dau_idx = vec![Vec::new(); n_mothers];
        for i in 0..n_mothers {
            if ndaus[i] > self.max_daughters {
                return Err(Error::Range(format!(
                    "mother {i} claims {} daughters with {} slots",
                    ndaus[i], self.max_daughters
                )));
            }
            for j in 0..ndaus[i] {
                let idx = dauidx_slots[j][i];
                let idx = usize::try_from(idx).map_err(|_| {
                    Error::Range(format!("negative daughter index {idx} for mother {i}"))
                })?;
                self.dau_lund[i].push(daulund_slots[j][i]);
                self.dau_idx[i].push(idx);
            }
        }
        Ok(())
    }

    /// Number of mothers in the current event.
    pub fn n_mothers(&self) -> usize {
        self.mother_lund.len()
    }

    /// Number of daughters of mother `i`.
    pub fn n_daughters(&self, i: usize) -> usize {
        self.dau_lund[i].len()
    }

    /// Lund id of mother `i`.
    pub fn mother_lund(&self, i: usize) -> i32 {
        self.mother_lund[i]
    }

    /// Lund id of daughter `j` of mother `i`.
    pub fn daughter_lund(&self, i: usize, j: usize) -> i32 {
        self.dau_lund[i][j]
    }

    /// Local index (within the daughter's own block) of daughter `j` of
    /// mother `i`.
    pub fn daughter_idx(&self, i: usize, j: usize) -> usize {
        self.dau_idx[i][j]
    }

    /// `(lund id, local index)` of daughter `j` of mother `i`.
    pub fn daughter_info(&self, i: usize, j: usize) -> (i32, usize) {
        (self.dau_lund[i][j], self.dau_idx[i][j])
    }
}

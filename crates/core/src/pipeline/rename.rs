//! Rename table: architectural to physical register mapping.
//!
//! One current entry per architectural register, `None` until first use.
//! Source lookups on an unmapped register seed a fresh physical register so
//! the source has *something* to read (the seeded register holds the PRF's
//! initial value; see [`crate::pipeline::prf::PhysRegFile::new`]).

use crate::common::{ArchReg, PhysReg};
use crate::pipeline::prf::PhysRegFile;

/// Current `ArchReg -> PhysReg` mapping.
#[derive(Clone, Debug)]
pub struct RenameTable {
    map: Vec<Option<PhysReg>>,
}

impl RenameTable {
    /// Creates a table of `size` unmapped registers.
    pub fn new(size: usize) -> Self {
        Self {
            map: vec![None; size],
        }
    }

    /// The current mapping for `ar`, if any.
    #[inline]
    pub fn current(&self, ar: ArchReg) -> Option<PhysReg> {
        self.map[ar.0]
    }

    /// Resolves a source operand to its physical register.
    ///
    /// An unmapped register is seeded: a physical register is allocated and
    /// bound as the current mapping. The seeded register is already ready
    /// (undefined value), so the consumer will not wait on it.
    ///
    /// Returns `None` only when the free list is exhausted; the caller must
    /// have reserved capacity beforehand (see the rename stage).
    pub fn lookup_src(&mut self, ar: ArchReg, prf: &mut PhysRegFile) -> Option<PhysReg> {
        if let Some(pr) = self.map[ar.0] {
            return Some(pr);
        }
        let pr = prf.allocate()?;
        self.map[ar.0] = Some(pr);
        Some(pr)
    }

    /// Renames a destination register.
    ///
    /// Allocates a fresh physical register, marks it pending, binds it as the
    /// current mapping, and returns it with the previous mapping (the
    /// `overwritten` register, released when this instruction commits).
    pub fn rename_dst(
        &mut self,
        ar: ArchReg,
        prf: &mut PhysRegFile,
    ) -> Option<(PhysReg, Option<PhysReg>)> {
        let pr = prf.allocate()?;
        prf.set_pending(pr);
        let overwritten = self.map[ar.0].replace(pr);
        Some((pr, overwritten))
    }

    /// Number of architectural registers currently mapped.
    pub fn mapped_count(&self) -> usize {
        self.map.iter().filter(|m| m.is_some()).count()
    }

    /// Iterates `(arch, phys)` over current mappings, for display.
    pub fn iter(&self) -> impl Iterator<Item = (ArchReg, Option<PhysReg>)> + '_ {
        self.map
            .iter()
            .copied()
            .enumerate()
            .map(|(i, m)| (ArchReg(i), m))
    }
}

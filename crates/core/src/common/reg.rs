//! Register and queue-slot identifiers.
//!
//! Newtype indices replace the C implementation's bare `int` fields and their
//! `-1`/`-2` sentinels: a slot that may be empty is an `Option` of one of
//! these, never a magic number.

use std::fmt;

/// Architectural register index, in `[0, REG_FILE_SIZE)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ArchReg(pub usize);

impl fmt::Display for ArchReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// Physical register index, in `[0, PRF_SIZE)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct PhysReg(pub usize);

impl fmt::Display for PhysReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Load/Store Queue ring slot index, in `[0, LSQ_SIZE)`.
///
/// The AGEN broadcast bus carries one of these as its tag (the consumer is an
/// LSQ entry, not a physical register).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct LsqSlot(pub usize);

impl fmt::Display for LsqSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LSQ{}", self.0)
    }
}

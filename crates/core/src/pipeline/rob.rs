//! Reorder Buffer: program-order retirement.
//!
//! The ROB is a circular buffer tracking every in-flight instruction from
//! dispatch to commit. It provides:
//! 1. **Allocation:** One slot per dispatched instruction, in program order.
//! 2. **Completion:** FU broadcasts mark entries done (and record flags).
//! 3. **In-order commit:** Only the head may retire; memory heads retire
//!    jointly with the LSQ drain.
//! 4. **Release bookkeeping:** Overwritten physical registers ride the entry
//!    and return to the free list at commit.

use crate::common::{ArchReg, CondFlags, LsqSlot, PhysReg};
use crate::isa::Opcode;

/// Broad classification of a ROB entry, driving its commit path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RobKind {
    /// Register-writing or flag-setting computation (includes NOP).
    Arith,
    /// LOAD/LOADP/STORE/STOREP; retired by the LSQ drain.
    Mem,
    /// Declared control-flow carrier (no redirect machinery yet).
    Branch,
    /// HALT; commits once HALT has issued, stopping the machine.
    Halt,
}

/// Lifecycle state of a ROB entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RobState {
    /// Allocated; execution not yet finished.
    Issued,
    /// Result available (for Mem entries the LSQ drain is the authority).
    Completed,
}

/// A single Reorder Buffer entry.
#[derive(Clone, Copy, Debug)]
pub struct RobEntry {
    /// Commit-path classification.
    pub kind: RobKind,
    /// Operation, for statistics and display.
    pub opcode: Opcode,
    /// Program counter.
    pub pc: u32,
    /// Architectural destination, written at commit.
    pub dest_ar: Option<ArchReg>,
    /// Physical destination whose value commits to `dest_ar`.
    pub dest: Option<PhysReg>,
    /// Previous mapping of `dest_ar`; freed at commit.
    pub overwritten: Option<PhysReg>,
    /// Previous mapping of the post-increment base; freed at commit.
    pub extra_overwritten: Option<PhysReg>,
    /// Matching LSQ slot for memory operations.
    pub lsq_slot: Option<LsqSlot>,
    /// Lifecycle state.
    pub state: RobState,
    /// Flags recorded at completion by flag-setting instructions.
    pub flags: Option<CondFlags>,
}

/// Reorder Buffer — circular buffer for in-order commit.
#[derive(Clone, Debug)]
pub struct ReorderBuffer {
    entries: Vec<Option<RobEntry>>,
    head: usize,
    tail: usize,
    count: usize,
}

impl ReorderBuffer {
    /// Creates a ROB with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: vec![None; capacity],
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    /// ROB capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Number of occupied entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// True if nothing is in flight.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// True if no slot is free.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.count == self.entries.len()
    }

    /// The slot index the next allocation will use.
    #[inline]
    pub fn next_slot(&self) -> usize {
        self.tail
    }

    /// Allocates an entry at the tail. Returns its slot, or `None` when full.
    pub fn allocate(&mut self, entry: RobEntry) -> Option<usize> {
        if self.is_full() {
            return None;
        }
        let slot = self.tail;
        self.entries[slot] = Some(entry);
        self.tail = (self.tail + 1) % self.entries.len();
        self.count += 1;
        Some(slot)
    }

    /// Marks `slot` completed, recording flags if the instruction set any.
    pub fn complete(&mut self, slot: usize, flags: Option<CondFlags>) {
        if let Some(entry) = self.entries[slot].as_mut() {
            entry.state = RobState::Completed;
            entry.flags = flags;
        }
    }

    /// The head entry and its slot, if any.
    pub fn peek_head(&self) -> Option<(usize, &RobEntry)> {
        if self.count == 0 {
            return None;
        }
        self.entries[self.head].as_ref().map(|e| (self.head, e))
    }

    /// Pops and returns the head entry.
    pub fn pop_head(&mut self) -> Option<RobEntry> {
        if self.count == 0 {
            return None;
        }
        let entry = self.entries[self.head].take();
        self.head = (self.head + 1) % self.entries.len();
        self.count -= 1;
        entry
    }

    /// Iterates occupied entries head-to-tail, for display and checks.
    pub fn iter_in_order(&self) -> impl Iterator<Item = (usize, &RobEntry)> {
        let cap = self.entries.len();
        (0..self.count).filter_map(move |i| {
            let idx = (self.head + i) % cap;
            self.entries[idx].as_ref().map(|e| (idx, e))
        })
    }
}

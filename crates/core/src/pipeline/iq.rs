//! Issue Queue with tag-broadcast wake-up and oldest-first select.
//!
//! The IQ is an unordered slot table. Entries wait on source operand tags;
//! each cycle every broadcast tag is matched against every waiting operand
//! (a linear scan — the queue is small, so dependency lists are an
//! optimization this design does not need). Selection picks, per functional
//! unit kind, the ready entry with the smallest dispatch cycle.

use crate::common::{LsqSlot, PhysReg};
use crate::isa::{FuKind, Opcode};

/// A source operand slot of an IQ or LSQ entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    /// The instruction has no operand in this slot (constant or unused).
    None,
    /// A renamed register operand and its readiness.
    Reg {
        /// Producing physical register.
        tag: PhysReg,
        /// True once the tag has broadcast (or was ready at dispatch).
        ready: bool,
    },
}

impl Operand {
    /// True when this operand no longer blocks issue.
    #[inline]
    pub fn is_ready(&self) -> bool {
        match self {
            Operand::None => true,
            Operand::Reg { ready, .. } => *ready,
        }
    }

    /// Marks the operand ready if `tag` matches.
    pub fn wake(&mut self, broadcast: PhysReg) {
        if let Operand::Reg { tag, ready } = self {
            if *tag == broadcast {
                *ready = true;
            }
        }
    }

    /// The operand's tag, if it is a register.
    pub fn tag(&self) -> Option<PhysReg> {
        match self {
            Operand::None => None,
            Operand::Reg { tag, .. } => Some(*tag),
        }
    }
}

/// Where an issued instruction delivers its result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IqDest {
    /// No destination (CMP, branches, HALT).
    None,
    /// A physical register, broadcast on the producing unit's bus.
    Preg(PhysReg),
    /// A Load/Store Queue slot: the AGEN bus carries the slot index.
    Lsq(LsqSlot),
}

/// A dispatched, not-yet-issued instruction.
#[derive(Clone, Copy, Debug)]
pub struct IqEntry {
    /// Functional unit kind this entry issues to.
    pub fu: FuKind,
    /// Operation.
    pub op: Opcode,
    /// Program counter, for tracing and display.
    pub pc: u32,
    /// Literal operand, when the format has one.
    pub imm: Option<i32>,
    /// First source (the address base, for memory ops).
    pub src1: Operand,
    /// Second source.
    pub src2: Operand,
    /// Result destination.
    pub dest: IqDest,
    /// Post-increment destination register (LOADP/STOREP base + 4).
    pub extra_dest: Option<PhysReg>,
    /// ROB slot of this instruction, completed on FU broadcast.
    pub rob_slot: usize,
    /// Cycle at which the entry was dispatched; select prefers the oldest.
    pub dispatch_cycle: u64,
}

impl IqEntry {
    /// True when every source operand is ready.
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.src1.is_ready() && self.src2.is_ready()
    }
}

/// The issue queue: an unordered table of waiting instructions.
#[derive(Clone, Debug)]
pub struct IssueQueue {
    slots: Vec<Option<IqEntry>>,
}

impl IssueQueue {
    /// Creates a queue with `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    /// Queue capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// True if no entries are waiting.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// True if at least one slot is free.
    pub fn has_free_slot(&self) -> bool {
        self.slots.iter().any(Option::is_none)
    }

    /// Inserts an entry into the first free slot. Returns false when full.
    pub fn insert(&mut self, entry: IqEntry) -> bool {
        for slot in &mut self.slots {
            if slot.is_none() {
                *slot = Some(entry);
                return true;
            }
        }
        false
    }

    /// Wake-up: marks matching source operands ready on every entry.
    pub fn wakeup(&mut self, tag: PhysReg) {
        for entry in self.slots.iter_mut().flatten() {
            entry.src1.wake(tag);
            entry.src2.wake(tag);
        }
    }

    /// Select: removes and returns the oldest ready entry for `fu`.
    ///
    /// Oldest means smallest dispatch cycle; ties break toward the smallest
    /// slot index. At most one entry issues per unit per cycle.
    pub fn select(&mut self, fu: FuKind) -> Option<IqEntry> {
        let mut best: Option<(usize, u64)> = None;
        for (idx, slot) in self.slots.iter().enumerate() {
            if let Some(entry) = slot {
                if entry.fu == fu && entry.is_ready() {
                    let better = match best {
                        None => true,
                        Some((_, cycle)) => entry.dispatch_cycle < cycle,
                    };
                    if better {
                        best = Some((idx, entry.dispatch_cycle));
                    }
                }
            }
        }
        best.and_then(|(idx, _)| self.slots[idx].take())
    }

    /// Iterates occupied entries, for display.
    pub fn iter(&self) -> impl Iterator<Item = &IqEntry> {
        self.slots.iter().flatten()
    }
}

//! Functional units and the per-cycle broadcast buses.
//!
//! Three units: INT (1 cycle), MUL (3 cycles, one in flight), AGEN (1 cycle).
//! Each holds at most one operation; operand *values* are latched at select
//! time and never re-read during execution. A completing unit publishes a
//! [`Completion`] on its bus slot for the wake-up phase to apply.

use tracing::trace;

use crate::common::{CondFlags, LsqSlot, PhysReg};
use crate::isa::{FuKind, Opcode};

/// Where a functional-unit result goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FuDest {
    /// No result register (CMP, CML, JUMP, branches, HALT).
    None,
    /// A physical register.
    Preg(PhysReg),
    /// A Load/Store Queue slot (AGEN address), with an optional
    /// post-increment register receiving `base + 4`.
    Mem {
        /// LSQ slot the computed address belongs to.
        slot: LsqSlot,
        /// Post-increment destination, for LOADP/STOREP.
        inc: Option<PhysReg>,
    },
}

/// An operation latched into a functional unit.
#[derive(Clone, Copy, Debug)]
pub struct FuOp {
    /// Operation.
    pub op: Opcode,
    /// Program counter, for tracing.
    pub pc: u32,
    /// ROB slot completed when this operation finishes.
    pub rob_slot: usize,
    /// Result destination.
    pub dest: FuDest,
    /// First source value (the address base, for memory ops).
    pub src1: i32,
    /// Second source value.
    pub src2: i32,
    /// Literal operand (zero when the format has none).
    pub imm: i32,
}

/// Everything a completing unit broadcasts at a cycle boundary.
#[derive(Clone, Copy, Debug)]
pub struct Completion {
    /// ROB slot to mark completed (ignored for address-only completions).
    pub rob_slot: usize,
    /// Operation that completed, for tracing.
    pub op: Opcode,
    /// Program counter.
    pub pc: u32,
    /// `(tag, value)` register broadcast.
    pub reg: Option<(PhysReg, i32)>,
    /// `(slot, address)` AGEN broadcast.
    pub agen: Option<(LsqSlot, i32)>,
    /// Post-increment `(tag, value)` broadcast (`base + 4`).
    pub inc: Option<(PhysReg, i32)>,
    /// Flags computed by flag-setting instructions.
    pub flags: Option<CondFlags>,
}

/// A single-operation functional unit with a fixed latency.
#[derive(Clone, Copy, Debug)]
pub struct FunctionalUnit {
    kind: FuKind,
    latency: u8,
    slot: Option<(FuOp, u8)>,
}

impl FunctionalUnit {
    /// Creates a unit of the given kind and latency.
    pub fn new(kind: FuKind, latency: u8) -> Self {
        debug_assert!(latency >= 1);
        Self {
            kind,
            latency,
            slot: None,
        }
    }

    /// The unit's kind.
    #[inline]
    pub fn kind(&self) -> FuKind {
        self.kind
    }

    /// True while an operation is in flight.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.slot.is_some()
    }

    /// The in-flight operation, for display.
    pub fn current(&self) -> Option<&FuOp> {
        self.slot.as_ref().map(|(op, _)| op)
    }

    /// Latches an operation. The unit must be idle.
    pub fn issue(&mut self, op: FuOp) {
        debug_assert!(self.slot.is_none(), "{} FU issued while busy", self.kind);
        self.slot = Some((op, self.latency));
    }

    /// Advances one cycle; returns the completion when the operation retires
    /// from the unit.
    pub fn tick(&mut self) -> Option<Completion> {
        let (op, remaining) = self.slot.as_mut()?;
        *remaining -= 1;
        if *remaining > 0 {
            return None;
        }
        let op = *op;
        self.slot = None;
        let completion = execute(&op);
        trace!(
            target: "apex::execute",
            pc = op.pc,
            op = %op.op,
            unit = %self.kind,
            result = ?completion.reg.map(|(_, v)| v),
            addr = ?completion.agen.map(|(_, a)| a),
            "completed"
        );
        Some(completion)
    }
}

/// Computes an operation's results and packages its broadcasts.
fn execute(op: &FuOp) -> Completion {
    let mut completion = Completion {
        rob_slot: op.rob_slot,
        op: op.op,
        pc: op.pc,
        reg: None,
        agen: None,
        inc: None,
        flags: None,
    };

    let result = match op.op {
        Opcode::Add => Some(op.src1.wrapping_add(op.src2)),
        Opcode::Sub => Some(op.src1.wrapping_sub(op.src2)),
        Opcode::Mul => Some(op.src1.wrapping_mul(op.src2)),
        Opcode::And => Some(op.src1 & op.src2),
        Opcode::Or => Some(op.src1 | op.src2),
        Opcode::Xor => Some(op.src1 ^ op.src2),
        Opcode::Movc => Some(op.imm),
        Opcode::Addl => Some(op.src1.wrapping_add(op.imm)),
        Opcode::Subl => Some(op.src1.wrapping_sub(op.imm)),
        Opcode::Cmp => Some(op.src1.wrapping_sub(op.src2)),
        Opcode::Cml => Some(op.src1.wrapping_sub(op.imm)),
        // Link value; the redirect itself is the unbuilt branch extension.
        Opcode::Jalr => Some(op.pc.wrapping_add(4) as i32),
        Opcode::Load | Opcode::Loadp | Opcode::Store | Opcode::Storep => {
            Some(op.src1.wrapping_add(op.imm))
        }
        Opcode::Jump
        | Opcode::Bz
        | Opcode::Bnz
        | Opcode::Bp
        | Opcode::Bnp
        | Opcode::Bn
        | Opcode::Bnn
        | Opcode::Halt
        | Opcode::Nop => None,
    };

    if op.op.sets_flags() {
        completion.flags = result.map(CondFlags::from_result);
    }

    match op.dest {
        FuDest::None => {}
        FuDest::Preg(tag) => {
            if let Some(value) = result {
                completion.reg = Some((tag, value));
            }
        }
        FuDest::Mem { slot, inc } => {
            if let Some(addr) = result {
                completion.agen = Some((slot, addr));
            }
            if let Some(tag) = inc {
                completion.inc = Some((tag, op.src1.wrapping_add(4)));
            }
        }
    }

    completion
}

/// The cycle's broadcast buses: one single-writer slot per producer.
///
/// The post-increment value rides its own slot rather than sharing the INT
/// bus, so an INT completion in the same cycle cannot collide with it; the
/// `mem` slot carries the load result published by the LSQ drain.
#[derive(Clone, Copy, Debug, Default)]
pub struct CycleBuses {
    /// INT unit completion.
    pub int: Option<Completion>,
    /// MUL unit completion.
    pub mul: Option<Completion>,
    /// AGEN unit completion (address, plus any post-increment value).
    pub agen: Option<Completion>,
    /// Load result `(tag, value)` from the LSQ memory stage.
    pub mem: Option<(PhysReg, i32)>,
}

impl CycleBuses {
    /// All `(tag, value)` register broadcasts on the buses this cycle.
    pub fn reg_broadcasts(&self) -> impl Iterator<Item = (PhysReg, i32)> + '_ {
        self.int
            .iter()
            .chain(self.mul.iter())
            .chain(self.agen.iter())
            .flat_map(|c| c.reg.into_iter().chain(c.inc))
            .chain(self.mem)
    }

    /// Unit completions this cycle.
    pub fn completions(&self) -> impl Iterator<Item = &Completion> {
        self.int.iter().chain(self.mul.iter()).chain(self.agen.iter())
    }
}

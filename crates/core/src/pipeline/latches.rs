//! Front-end pipeline latches.
//!
//! The front-end is two single-slot latches with plain occupied/empty
//! predicates: fetch fills the decode latch, decode/rename fills the dispatch
//! latch, and a stage stalls simply by leaving its output latch occupied.

use crate::common::{ArchReg, PhysReg};
use crate::isa::{Instruction, Opcode};

/// A fetched instruction waiting in the decode latch.
#[derive(Clone, Copy, Debug)]
pub struct FetchedInst {
    /// Program counter the instruction was fetched from.
    pub pc: u32,
    /// The decoded instruction.
    pub inst: Instruction,
}

/// A renamed instruction waiting in the dispatch latch.
///
/// All register operands are physical at this point; architectural indices
/// survive only where commit needs them (destination and post-increment base).
#[derive(Clone, Copy, Debug)]
pub struct DispatchToken {
    /// Program counter.
    pub pc: u32,
    /// Operation.
    pub opcode: Opcode,
    /// Literal operand.
    pub imm: Option<i32>,
    /// Renamed first source.
    pub src1: Option<PhysReg>,
    /// Renamed second source.
    pub src2: Option<PhysReg>,
    /// Architectural destination.
    pub dest_ar: Option<ArchReg>,
    /// Renamed destination.
    pub dest: Option<PhysReg>,
    /// Previous mapping of `dest_ar`, freed when this instruction commits.
    pub overwritten: Option<PhysReg>,
    /// Architectural base register updated by post-increment ops.
    pub base_ar: Option<ArchReg>,
    /// Renamed post-increment destination (`base + 4`).
    pub extra_dest: Option<PhysReg>,
    /// Previous mapping of `base_ar`, freed when this instruction commits.
    pub extra_overwritten: Option<PhysReg>,
}

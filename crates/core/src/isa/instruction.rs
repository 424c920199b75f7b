//! Decoded instruction representation.

use std::fmt;

use crate::common::ArchReg;
use crate::isa::opcode::{Format, Opcode};

/// A decoded APEX instruction as stored in code memory.
///
/// Operand fields are populated according to the opcode's [`Format`]; absent
/// operands are `None` rather than sentinel indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instruction {
    /// The operation.
    pub opcode: Opcode,
    /// Destination register, for formats that write one.
    pub rd: Option<ArchReg>,
    /// First source register.
    pub rs1: Option<ArchReg>,
    /// Second source register.
    pub rs2: Option<ArchReg>,
    /// Signed literal operand.
    pub imm: Option<i32>,
}

impl Instruction {
    /// A `NOP` instruction.
    pub fn nop() -> Self {
        Self {
            opcode: Opcode::Nop,
            rd: None,
            rs1: None,
            rs2: None,
            imm: None,
        }
    }
}

impl fmt::Display for Instruction {
    /// Renders the instruction in assembly syntax (`ADD,R3,R1,R2`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = self.opcode;
        match op.format() {
            Format::RegRegReg => write!(
                f,
                "{},{},{},{}",
                op,
                fmt_reg(self.rd),
                fmt_reg(self.rs1),
                fmt_reg(self.rs2)
            ),
            Format::RegRegImm => write!(
                f,
                "{},{},{},#{}",
                op,
                fmt_reg(self.rd),
                fmt_reg(self.rs1),
                self.imm.unwrap_or(0)
            ),
            Format::RegImm => write!(f, "{},{},#{}", op, fmt_reg(self.rd), self.imm.unwrap_or(0)),
            Format::SrcSrcImm => write!(
                f,
                "{},{},{},#{}",
                op,
                fmt_reg(self.rs1),
                fmt_reg(self.rs2),
                self.imm.unwrap_or(0)
            ),
            Format::SrcSrc => write!(f, "{},{},{}", op, fmt_reg(self.rs1), fmt_reg(self.rs2)),
            Format::SrcImm => write!(f, "{},{},#{}", op, fmt_reg(self.rs1), self.imm.unwrap_or(0)),
            Format::Imm => write!(f, "{},#{}", op, self.imm.unwrap_or(0)),
            Format::Bare => write!(f, "{op}"),
        }
    }
}

fn fmt_reg(reg: Option<ArchReg>) -> String {
    reg.map_or_else(|| "R?".to_string(), |r| r.to_string())
}

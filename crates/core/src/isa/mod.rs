//! The APEX instruction set.
//!
//! Opcode definitions, decoded instruction structures, and the text assembly
//! parser used by the program loader.

pub mod asm;
pub mod instruction;
pub mod opcode;

pub use instruction::Instruction;
pub use opcode::{FuKind, Opcode};

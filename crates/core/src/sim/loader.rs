//! Program loader: assembly file to code memory.

use std::fs;

use tracing::info;

use crate::common::SimError;
use crate::config::Config;
use crate::isa::{asm, Instruction};

/// Reads and parses an assembly program file.
///
/// # Errors
///
/// `SimError::BadFile` when the file cannot be read; `BadInstruction` /
/// `EmptyProgram` from the parser.
pub fn load_program(path: &str, config: &Config) -> Result<Vec<Instruction>, SimError> {
    let source = fs::read_to_string(path).map_err(|e| SimError::BadFile {
        path: path.to_string(),
        source: e,
    })?;
    let program = asm::parse_program(&source, config.machine.reg_file_size)?;
    info!(target: "apex::loader", path, instructions = program.len(), "program loaded");
    Ok(program)
}

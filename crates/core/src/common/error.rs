//! Simulator error definitions.
//!
//! Only the program loader produces recoverable errors; structural hazards
//! inside the pipeline are handled by back-pressure and never surface as
//! `Err` values.

use thiserror::Error;

/// Errors raised while loading a program into the simulator.
#[derive(Debug, Error)]
pub enum SimError {
    /// The program file could not be opened or read.
    #[error("cannot read program file '{path}': {source}")]
    BadFile {
        /// Path the loader attempted to open.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A line of the program did not parse as an APEX instruction.
    #[error("bad instruction at line {line}: '{text}': {reason}")]
    BadInstruction {
        /// One-based source line number.
        line: usize,
        /// The offending source text.
        text: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A register operand was malformed or outside the architectural
    /// register file.
    #[error("unknown register '{0}'")]
    UnknownRegister(String),

    /// The program contained no instructions.
    #[error("program is empty")]
    EmptyProgram,
}

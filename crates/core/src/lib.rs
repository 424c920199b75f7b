//! APEX out-of-order pipeline simulator library.
//!
//! This crate implements a cycle-accurate, single-core APEX simulator with the following:
//! 1. **Front-end:** Fetch and combined Decode/Rename over single-slot latches.
//! 2. **Back-end:** Issue Queue with wake-up/select, Load/Store Queue, Reorder Buffer,
//!    Physical Register File with a free list, and three functional units (INT, MUL, AGEN).
//! 3. **ISA:** A RISC-style instruction set (integer arithmetic, memory, post-increment
//!    load/store, compare, control-flow carriers) decoded from text assembly listings.
//! 4. **Simulation:** `Simulator` (owns architectural and micro-architectural state),
//!    assembly loader, configuration, and statistics.

/// Architectural state: committed registers, flags, code and data memory.
pub mod arch;
/// Common types (register identifiers, errors, condition flags).
pub mod common;
/// Simulator configuration (defaults and serde-deserializable structures).
pub mod config;
/// Instruction set: opcodes, instruction formats, and the assembly parser.
pub mod isa;
/// Pipeline components: PRF, rename table, IQ, LSQ, ROB, FUs, and stage logic.
pub mod pipeline;
/// Simulation: `Simulator`, the program loader, and state display helpers.
pub mod sim;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Top-level simulator; construct with `Simulator::new`.
pub use crate::sim::simulator::Simulator;

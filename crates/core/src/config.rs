//! Configuration system for the APEX simulator.
//!
//! This module defines the configuration structures used to parameterize the
//! simulator. It provides:
//! 1. **Defaults:** Baseline hardware constants (register file sizes, queue
//!    capacities, memory geometry).
//! 2. **Structures:** Hierarchical config for machine sizes and simulation
//!    behavior, deserializable from JSON.
//!
//! Use `Config::default()` for the CLI, or deserialize overrides from JSON.

use serde::Deserialize;

/// Default configuration constants for the simulator.
///
/// These values define the baseline machine when not explicitly overridden.
pub mod defaults {
    /// Number of architectural registers (`R0..R15`).
    pub const REG_FILE_SIZE: usize = 16;

    /// Number of physical registers in the PRF.
    ///
    /// Must exceed the architectural count; the surplus covers in-flight
    /// renames (typically `REG_FILE_SIZE + ROB_SIZE` or more).
    pub const PRF_SIZE: usize = 40;

    /// Issue Queue capacity (unordered slots).
    pub const IQ_SIZE: usize = 12;

    /// Load/Store Queue capacity (program-order ring).
    pub const LSQ_SIZE: usize = 8;

    /// Reorder Buffer capacity (program-order ring).
    pub const ROB_SIZE: usize = 12;

    /// Branch queue capacity (slots reserved for in-flight control flow).
    pub const BRANCH_QUEUE_SIZE: usize = 4;

    /// Data memory size in 32-bit words, zero-initialized.
    pub const DATA_MEMORY_SIZE: usize = 4096;

    /// Base address of code memory; instructions occupy 4 bytes each.
    pub const CODE_BASE: u32 = 4000;

    /// MUL functional unit latency in cycles.
    pub const MUL_LATENCY: u8 = 3;

    /// LSQ-head memory stage latency in cycles.
    pub const MEM_LATENCY: u8 = 2;
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// Creating a default configuration:
///
/// ```
/// use apex_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.machine.prf_size, 40);
/// assert_eq!(config.machine.iq_size, 12);
/// ```
///
/// Deserializing overrides from JSON:
///
/// ```
/// use apex_core::config::Config;
///
/// let json = r#"{
///     "machine": {
///         "iq_size": 1,
///         "rob_size": 4
///     }
/// }"#;
///
/// let config: Config = serde_json::from_str(json).unwrap();
/// assert_eq!(config.machine.iq_size, 1);
/// assert_eq!(config.machine.rob_size, 4);
/// assert_eq!(config.machine.prf_size, 40);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Machine size parameters.
    #[serde(default)]
    pub machine: MachineConfig,
}

/// Machine size parameters: register files, queues, and memory geometry.
#[derive(Debug, Clone, Deserialize)]
pub struct MachineConfig {
    /// Number of architectural registers.
    #[serde(default = "MachineConfig::default_reg_file_size")]
    pub reg_file_size: usize,

    /// Number of physical registers.
    #[serde(default = "MachineConfig::default_prf_size")]
    pub prf_size: usize,

    /// Issue Queue capacity.
    #[serde(default = "MachineConfig::default_iq_size")]
    pub iq_size: usize,

    /// Load/Store Queue capacity.
    #[serde(default = "MachineConfig::default_lsq_size")]
    pub lsq_size: usize,

    /// Reorder Buffer capacity.
    #[serde(default = "MachineConfig::default_rob_size")]
    pub rob_size: usize,

    /// Branch queue capacity.
    #[serde(default = "MachineConfig::default_branch_queue_size")]
    pub branch_queue_size: usize,

    /// Data memory size in words.
    #[serde(default = "MachineConfig::default_data_memory_size")]
    pub data_memory_size: usize,
}

impl MachineConfig {
    fn default_reg_file_size() -> usize {
        defaults::REG_FILE_SIZE
    }
    fn default_prf_size() -> usize {
        defaults::PRF_SIZE
    }
    fn default_iq_size() -> usize {
        defaults::IQ_SIZE
    }
    fn default_lsq_size() -> usize {
        defaults::LSQ_SIZE
    }
    fn default_rob_size() -> usize {
        defaults::ROB_SIZE
    }
    fn default_branch_queue_size() -> usize {
        defaults::BRANCH_QUEUE_SIZE
    }
    fn default_data_memory_size() -> usize {
        defaults::DATA_MEMORY_SIZE
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            reg_file_size: defaults::REG_FILE_SIZE,
            prf_size: defaults::PRF_SIZE,
            iq_size: defaults::IQ_SIZE,
            lsq_size: defaults::LSQ_SIZE,
            rob_size: defaults::ROB_SIZE,
            branch_queue_size: defaults::BRANCH_QUEUE_SIZE,
            data_memory_size: defaults::DATA_MEMORY_SIZE,
        }
    }
}

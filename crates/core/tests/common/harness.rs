use apex_core::config::Config;
use apex_core::sim::{RunOutcome, Simulator};

/// Generous per-test cycle budget; any program used in tests halts well
/// under this unless the machine has deadlocked.
pub const CYCLE_BUDGET: u64 = 50_000;

pub struct TestContext {
    pub sim: Simulator,
}

impl TestContext {
    /// Builds a machine from assembly source with the default configuration.
    pub fn assemble(source: &str) -> Self {
        Self::assemble_with(source, &Config::default())
    }

    /// Builds a machine from assembly source with a custom configuration.
    pub fn assemble_with(source: &str, config: &Config) -> Self {
        let sim = Simulator::from_source(source, config)
            .unwrap_or_else(|e| panic!("bad test program: {e}"));
        Self { sim }
    }

    /// Runs to HALT, panicking if the machine fails to halt in budget.
    /// Returns the cycle count.
    pub fn run_to_halt(&mut self) -> u64 {
        match self.sim.run(CYCLE_BUDGET) {
            RunOutcome::Halted => self.sim.clock,
            RunOutcome::CycleLimit => panic!("machine did not halt within {CYCLE_BUDGET} cycles"),
        }
    }

    /// Committed architectural register value.
    pub fn reg(&self, index: usize) -> i32 {
        self.sim.reg(index)
    }

    /// Data-memory word.
    pub fn mem(&self, addr: i32) -> i32 {
        self.sim.mem_word(addr)
    }
}

/// A machine-size configuration shrunk to provoke structural hazards.
pub fn tiny_config(iq: usize, lsq: usize, rob: usize) -> Config {
    let mut config = Config::default();
    config.machine.iq_size = iq;
    config.machine.lsq_size = lsq;
    config.machine.rob_size = rob;
    config
}

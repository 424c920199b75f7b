//! The simulator: owns all architectural and micro-architectural state and
//! advances it one clock cycle at a time.
//!
//! Intra-cycle ordering is fixed:
//! 1. Functional units execute, producing this cycle's broadcasts.
//! 2. Commit/drain: ROB-head retirement, LSQ memory stage, free-list returns.
//! 3. Wake-up: broadcasts applied to the PRF, IQ, LSQ, and ROB.
//! 4. Select: oldest ready IQ entry per unit moves into its FU latch.
//! 5. Allocate: the dispatch-latch instruction enters IQ/ROB/LSQ, or stalls.
//! 6. Decode/rename.
//! 7. Fetch.
//!
//! A value produced in cycle *t* is therefore visible to consumers selected
//! in cycle *t* (wake-up at step 3 runs before select at step 4), and the
//! consumer reads the just-broadcast value from the PRF, which the wake-up
//! phase wrote before any select happened.

use tracing::debug;

use crate::arch::{ArchState, CodeMemory, DataMemory};
use crate::common::{ArchReg, CondFlags, SimError};
use crate::config::{defaults, Config};
use crate::isa::{asm, FuKind, Instruction};
use crate::pipeline::commit::commit_stage;
use crate::pipeline::dispatch::{apply_broadcasts, select_and_issue, try_dispatch};
use crate::pipeline::frontend::{decode_rename_stage, fetch_stage};
use crate::pipeline::latches::{DispatchToken, FetchedInst};
use crate::pipeline::{
    BranchQueue, CycleBuses, FunctionalUnit, IssueQueue, LoadStoreQueue, MemStage, PhysRegFile,
    RenameTable, ReorderBuffer,
};
use crate::stats::SimStats;

/// Why a bounded run returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// HALT committed; the machine is stopped for good.
    Halted,
    /// The cycle limit was reached first; the machine can keep running.
    CycleLimit,
}

/// The APEX machine.
#[derive(Debug)]
pub struct Simulator {
    /// Committed registers and flags.
    pub arch: ArchState,
    /// The loaded program.
    pub code: CodeMemory,
    /// Word-addressed data memory.
    pub mem: DataMemory,
    /// Physical register file and free list.
    pub prf: PhysRegFile,
    /// Architectural-to-physical mapping.
    pub rename: RenameTable,
    /// Issue queue.
    pub iq: IssueQueue,
    /// Load/store queue.
    pub lsq: LoadStoreQueue,
    /// Reorder buffer.
    pub rob: ReorderBuffer,
    /// In-flight control-flow slot accounting.
    pub branches: BranchQueue,
    /// Integer unit (1 cycle).
    pub int_fu: FunctionalUnit,
    /// Multiplier (3 cycles).
    pub mul_fu: FunctionalUnit,
    /// Address generator (1 cycle).
    pub agen_fu: FunctionalUnit,
    /// Fetch output / decode input latch.
    pub fetch_latch: Option<FetchedInst>,
    /// Rename output / dispatch input latch.
    pub dispatch_latch: Option<DispatchToken>,
    /// Next fetch address.
    pub pc: u32,
    /// Cycles elapsed.
    pub clock: u64,
    /// Set once HALT (or the end of the program) has been fetched.
    pub fetch_done: bool,
    /// Set once HALT has issued from the IQ; arms the HALT commit.
    pub halt_issued: bool,
    /// Set once HALT has committed; ticks are no-ops afterwards.
    pub halted: bool,
    /// LSQ-head memory stage counter.
    pub mem_stage: MemStage,
    /// Run statistics.
    pub stats: SimStats,
}

impl Simulator {
    /// Builds a machine around a parsed program.
    pub fn new(program: Vec<Instruction>, config: &Config) -> Self {
        let m = &config.machine;
        let base = defaults::CODE_BASE;
        debug!(
            target: "apex::sim",
            instructions = program.len(),
            pc = base,
            "initialized"
        );
        Self {
            arch: ArchState::new(m.reg_file_size),
            code: CodeMemory::new(program),
            mem: DataMemory::new(m.data_memory_size),
            prf: PhysRegFile::new(m.prf_size),
            rename: RenameTable::new(m.reg_file_size),
            iq: IssueQueue::new(m.iq_size),
            lsq: LoadStoreQueue::new(m.lsq_size),
            rob: ReorderBuffer::new(m.rob_size),
            branches: BranchQueue::new(m.branch_queue_size),
            int_fu: FunctionalUnit::new(FuKind::Int, 1),
            mul_fu: FunctionalUnit::new(FuKind::Mul, defaults::MUL_LATENCY),
            agen_fu: FunctionalUnit::new(FuKind::Agen, 1),
            fetch_latch: None,
            dispatch_latch: None,
            pc: base,
            clock: 0,
            fetch_done: false,
            halt_issued: false,
            halted: false,
            mem_stage: MemStage::default(),
            stats: SimStats::default(),
        }
    }

    /// Parses assembly source and builds a machine around it.
    pub fn from_source(source: &str, config: &Config) -> Result<Self, SimError> {
        let program = asm::parse_program(source, config.machine.reg_file_size)?;
        Ok(Self::new(program, config))
    }

    /// Advances the machine one clock cycle. A halted machine stays halted.
    pub fn tick(&mut self) {
        if self.halted {
            return;
        }
        self.clock += 1;

        // 1. Execute: completing units publish this cycle's broadcasts.
        let mut buses = CycleBuses {
            int: self.int_fu.tick(),
            mul: self.mul_fu.tick(),
            agen: self.agen_fu.tick(),
            mem: None,
        };

        // 2. Commit and drain.
        let halted = commit_stage(
            &mut self.arch,
            &mut self.mem,
            &mut self.rob,
            &mut self.lsq,
            &mut self.prf,
            &mut self.branches,
            &mut self.mem_stage,
            &mut buses,
            self.halt_issued,
            &mut self.stats,
        );

        // 3. Wake-up.
        apply_broadcasts(
            &buses,
            &mut self.prf,
            &mut self.iq,
            &mut self.lsq,
            &mut self.rob,
        );

        // 4. Select.
        select_and_issue(
            &mut self.iq,
            &self.prf,
            &mut self.int_fu,
            &mut self.mul_fu,
            &mut self.agen_fu,
            &mut self.halt_issued,
        );

        // 5. Allocate.
        try_dispatch(
            &mut self.dispatch_latch,
            &mut self.iq,
            &mut self.lsq,
            &mut self.rob,
            &mut self.branches,
            &self.prf,
            self.clock,
            &mut self.stats,
        );

        // 6. Decode/rename.
        decode_rename_stage(
            &mut self.fetch_latch,
            &mut self.dispatch_latch,
            &mut self.rename,
            &mut self.prf,
            &mut self.stats,
        );

        // 7. Fetch.
        fetch_stage(
            &mut self.pc,
            &self.code,
            &mut self.fetch_latch,
            &mut self.fetch_done,
        );

        self.stats.cycles = self.clock;
        if halted {
            debug!(target: "apex::sim", clock = self.clock, "halted");
            self.halted = true;
        }
    }

    /// Runs until HALT commits or the machine's clock reaches `cycle_limit`.
    pub fn run(&mut self, cycle_limit: u64) -> RunOutcome {
        while !self.halted {
            if self.clock >= cycle_limit {
                return RunOutcome::CycleLimit;
            }
            self.tick();
        }
        RunOutcome::Halted
    }

    /// Committed value of an architectural register.
    #[inline]
    pub fn reg(&self, index: usize) -> i32 {
        self.arch.read(ArchReg(index))
    }

    /// Committed condition flags.
    #[inline]
    pub fn flags(&self) -> CondFlags {
        self.arch.flags
    }

    /// The data-memory word at `addr`.
    #[inline]
    pub fn mem_word(&self, addr: i32) -> i32 {
        self.mem.read(addr)
    }

    /// True once HALT has committed.
    #[inline]
    pub fn is_halted(&self) -> bool {
        self.halted
    }
}

//! Commit stage: in-order retirement and the LSQ memory drain.
//!
//! At most one instruction retires per cycle, always from the ROB head:
//! 1. Arithmetic/control heads retire once completed: architectural write,
//!    flag update, overwritten-register release.
//! 2. Memory heads retire through the two-cycle memory stage at the LSQ head;
//!    the LSQ entry and the ROB entry pop jointly, and post-increment ops
//!    write the incremented base back to its architectural register.
//! 3. The HALT head retires once HALT has issued, stopping the machine.
//!
//! Memory side-effects happen here, at-or-after the commit point, which is
//! what keeps the reordered machine sequentially consistent with itself.

use tracing::trace;

use crate::arch::{ArchState, DataMemory};
use crate::config::defaults::MEM_LATENCY;
use crate::pipeline::branch::BranchQueue;
use crate::pipeline::fu::CycleBuses;
use crate::pipeline::lsq::LoadStoreQueue;
use crate::pipeline::prf::PhysRegFile;
use crate::pipeline::rob::{ReorderBuffer, RobEntry, RobKind, RobState};
use crate::stats::SimStats;

/// The LSQ-head memory stage counter.
#[derive(Clone, Copy, Debug, Default)]
pub struct MemStage {
    /// Memory cycles completed for the current head (drains at `MEM_LATENCY`).
    pub cycles_done: u8,
}

/// Runs one commit cycle. Returns `true` when HALT commits.
#[allow(clippy::too_many_arguments)]
pub fn commit_stage(
    arch: &mut ArchState,
    mem: &mut DataMemory,
    rob: &mut ReorderBuffer,
    lsq: &mut LoadStoreQueue,
    prf: &mut PhysRegFile,
    branches: &mut BranchQueue,
    mem_stage: &mut MemStage,
    buses: &mut CycleBuses,
    halt_issued: bool,
    stats: &mut SimStats,
) -> bool {
    let Some((_, head)) = rob.peek_head() else {
        return false;
    };

    match head.kind {
        RobKind::Arith | RobKind::Branch => {
            if head.state != RobState::Completed {
                return false;
            }
            let Some(entry) = rob.pop_head() else {
                return false;
            };
            if let (Some(ar), Some(pr)) = (entry.dest_ar, entry.dest) {
                let value = prf.value(pr);
                arch.write(ar, value);
                trace!(target: "apex::commit", pc = entry.pc, %ar, %pr, value, "retired");
            } else {
                trace!(target: "apex::commit", pc = entry.pc, op = %entry.opcode, "retired");
            }
            if let Some(flags) = entry.flags {
                arch.flags = flags;
            }
            release_overwritten(&entry, prf);
            if entry.kind == RobKind::Branch {
                branches.pop();
            }
            stats.record_retire(entry.opcode);
            false
        }

        RobKind::Mem => drain_memory_head(arch, mem, rob, lsq, prf, mem_stage, buses, stats),

        RobKind::Halt => {
            if !halt_issued {
                return false;
            }
            let Some(entry) = rob.pop_head() else {
                return false;
            };
            trace!(target: "apex::commit", pc = entry.pc, "HALT retired, stopping");
            stats.record_retire(entry.opcode);
            true
        }
    }
}

/// Advances the memory stage for the matching ROB-head / LSQ-head pair.
fn drain_memory_head(
    arch: &mut ArchState,
    mem: &mut DataMemory,
    rob: &mut ReorderBuffer,
    lsq: &mut LoadStoreQueue,
    prf: &mut PhysRegFile,
    mem_stage: &mut MemStage,
    buses: &mut CycleBuses,
    stats: &mut SimStats,
) -> bool {
    {
        let Some((_, head)) = rob.peek_head() else {
            return false;
        };
        debug_assert_eq!(
            head.lsq_slot,
            lsq.head_slot(),
            "ROB head and LSQ head disagree on the next memory op"
        );
        let Some(entry) = lsq.head() else {
            return false;
        };
        if !entry.is_drain_ready() {
            return false;
        }
        mem_stage.cycles_done += 1;
        if mem_stage.cycles_done < MEM_LATENCY {
            return false;
        }
    }
    mem_stage.cycles_done = 0;

    let (Some(lsq_entry), Some(rob_entry)) = (lsq.pop_head(), rob.pop_head()) else {
        return false;
    };
    let Some(addr) = lsq_entry.addr else {
        return false;
    };

    if lsq_entry.op.is_load() {
        let value = mem.read(addr);
        if let Some(dest) = lsq_entry.dest {
            // Publishing on the mem bus both writes the PRF and wakes
            // dependents in this cycle's wake-up phase.
            buses.mem = Some((dest, value));
        }
        if let Some(ar) = rob_entry.dest_ar {
            arch.write(ar, value);
        }
        trace!(target: "apex::mem", pc = lsq_entry.pc, addr, value, "load drained");
    } else if let Some(data_tag) = lsq_entry.data.tag() {
        let value = prf.value(data_tag);
        mem.write(addr, value);
        trace!(target: "apex::mem", pc = lsq_entry.pc, addr, value, "store drained");
    }

    if let Some(base) = lsq_entry.base_update {
        arch.write(base.ar, prf.value(base.preg));
    }

    release_overwritten(&rob_entry, prf);
    stats.record_retire(rob_entry.opcode);
    false
}

fn release_overwritten(entry: &RobEntry, prf: &mut PhysRegFile) {
    if let Some(pr) = entry.overwritten {
        prf.free(pr);
    }
    if let Some(pr) = entry.extra_overwritten {
        prf.free(pr);
    }
}

//! Dispatch stage: broadcast application, select, and allocation.
//!
//! This is the issue-window heart of the machine. Within one cycle it
//! (in the fixed order driven by the simulator):
//! 1. applies the cycle's broadcasts to the PRF, IQ, LSQ, and ROB (wake-up),
//! 2. selects at most one ready IQ entry per functional unit and latches it
//!    with operand values read from the PRF (same-cycle forwarding falls out
//!    of wake-up running first),
//! 3. admits the instruction in the dispatch latch into IQ/ROB/LSQ if every
//!    structure has room, stalling it otherwise.

use tracing::trace;

use crate::isa::{FuKind, Opcode};
use crate::pipeline::branch::BranchQueue;
use crate::pipeline::fu::{CycleBuses, FuDest, FuOp, FunctionalUnit};
use crate::pipeline::iq::{IqDest, IqEntry, IssueQueue, Operand};
use crate::pipeline::latches::DispatchToken;
use crate::pipeline::lsq::{BaseUpdate, LoadStoreQueue, LsqEntry};
use crate::pipeline::prf::PhysRegFile;
use crate::pipeline::rob::{ReorderBuffer, RobEntry, RobKind, RobState};
use crate::stats::SimStats;

/// Wake-up: applies this cycle's broadcasts to every consumer.
///
/// Register broadcasts write the PRF and ready matching IQ/LSQ operands; the
/// AGEN broadcast resolves its LSQ entry's address; unit completions mark
/// their ROB entries done (memory ops excepted: address generation is not
/// completion, the LSQ drain is).
pub fn apply_broadcasts(
    buses: &CycleBuses,
    prf: &mut PhysRegFile,
    iq: &mut IssueQueue,
    lsq: &mut LoadStoreQueue,
    rob: &mut ReorderBuffer,
) {
    for (tag, value) in buses.reg_broadcasts() {
        trace!(target: "apex::wakeup", %tag, value, "broadcast");
        prf.write(tag, value);
        iq.wakeup(tag);
        lsq.wakeup(tag);
    }
    for completion in buses.completions() {
        if let Some((slot, addr)) = completion.agen {
            trace!(target: "apex::wakeup", %slot, addr, "address resolved");
            lsq.set_addr(slot, addr);
        }
        if !completion.op.is_mem() {
            rob.complete(completion.rob_slot, completion.flags);
        }
    }
}

/// Select: issues the oldest ready IQ entry to each idle functional unit.
///
/// Operand values are read once, here, from the PRF; execution never re-reads
/// them. Issuing HALT records that the halt has reached issue, which arms its
/// commit.
pub fn select_and_issue(
    iq: &mut IssueQueue,
    prf: &PhysRegFile,
    int_fu: &mut FunctionalUnit,
    mul_fu: &mut FunctionalUnit,
    agen_fu: &mut FunctionalUnit,
    halt_issued: &mut bool,
) {
    issue_to_unit(iq, prf, int_fu, halt_issued);
    issue_to_unit(iq, prf, mul_fu, halt_issued);
    issue_to_unit(iq, prf, agen_fu, halt_issued);
}

fn issue_to_unit(
    iq: &mut IssueQueue,
    prf: &PhysRegFile,
    unit: &mut FunctionalUnit,
    halt_issued: &mut bool,
) {
    if unit.is_busy() {
        return;
    }
    let Some(entry) = iq.select(unit.kind()) else {
        return;
    };

    let src1 = entry.src1.tag().map_or(0, |t| prf.value(t));
    let src2 = entry.src2.tag().map_or(0, |t| prf.value(t));
    let dest = match entry.dest {
        IqDest::None => FuDest::None,
        IqDest::Preg(pr) => FuDest::Preg(pr),
        IqDest::Lsq(slot) => FuDest::Mem {
            slot,
            inc: entry.extra_dest,
        },
    };

    if entry.op == Opcode::Halt {
        *halt_issued = true;
    }

    trace!(
        target: "apex::issue",
        pc = entry.pc,
        op = %entry.op,
        unit = %unit.kind(),
        src1,
        src2,
        "issued"
    );

    unit.issue(FuOp {
        op: entry.op,
        pc: entry.pc,
        rob_slot: entry.rob_slot,
        dest,
        src1,
        src2,
        imm: entry.imm.unwrap_or(0),
    });
}

/// Allocate: admits the dispatch-latch instruction into the back-end.
///
/// Admission requires room in *all* structures the instruction touches (ROB;
/// IQ unless it is a NOP; LSQ for memory ops; branch queue for control flow).
/// On failure the latch is left occupied, back-pressuring decode and fetch.
#[allow(clippy::too_many_arguments)]
pub fn try_dispatch(
    dispatch_latch: &mut Option<DispatchToken>,
    iq: &mut IssueQueue,
    lsq: &mut LoadStoreQueue,
    rob: &mut ReorderBuffer,
    branches: &mut BranchQueue,
    prf: &PhysRegFile,
    clock: u64,
    stats: &mut SimStats,
) {
    let Some(token) = *dispatch_latch else {
        return;
    };
    let op = token.opcode;
    let needs_iq = op.fu_kind().is_some();

    let admitted = !rob.is_full()
        && (!needs_iq || iq.has_free_slot())
        && (!op.is_mem() || !lsq.is_full())
        && (!op.is_control_flow() || branches.has_free_slot());
    if !admitted {
        stats.dispatch_stalls += 1;
        trace!(target: "apex::dispatch", pc = token.pc, "structural stall");
        return;
    }

    let rob_slot = rob.next_slot();

    // Memory ops reserve their LSQ entry first so the IQ entry can carry the
    // slot as the AGEN destination tag.
    let mut lsq_slot = None;
    if op.is_mem() {
        let data = if op.is_store() {
            // Store data is Rs1; its readiness is tracked here, not in the IQ.
            token.src1.map_or(Operand::None, |tag| Operand::Reg {
                tag,
                ready: prf.is_ready(tag),
            })
        } else {
            Operand::None
        };
        let base_update = match (token.base_ar, token.extra_dest) {
            (Some(ar), Some(preg)) => Some(BaseUpdate { ar, preg }),
            _ => None,
        };
        lsq_slot = lsq.allocate(LsqEntry {
            op,
            pc: token.pc,
            addr: None,
            data,
            dest: token.dest,
            base_update,
            rob_slot,
        });
        debug_assert!(lsq_slot.is_some(), "LSQ full after admission check");
    }

    if needs_iq {
        // The AGEN operand is the address base: Rs1 for loads, Rs2 for stores.
        let (s1, s2) = if op.is_store() {
            (token.src2, None)
        } else if op.is_mem() {
            (token.src1, None)
        } else {
            (token.src1, token.src2)
        };
        let dest = match (lsq_slot, token.dest) {
            (Some(slot), _) => IqDest::Lsq(slot),
            (None, Some(pr)) => IqDest::Preg(pr),
            (None, None) => IqDest::None,
        };
        let inserted = iq.insert(IqEntry {
            fu: op.fu_kind().unwrap_or(FuKind::Int),
            op,
            pc: token.pc,
            imm: token.imm,
            src1: operand(s1, prf),
            src2: operand(s2, prf),
            dest,
            extra_dest: token.extra_dest,
            rob_slot,
            dispatch_cycle: clock,
        });
        debug_assert!(inserted, "IQ full after admission check");
    }

    let kind = match op {
        Opcode::Halt => RobKind::Halt,
        _ if op.is_mem() => RobKind::Mem,
        _ if op.is_control_flow() => RobKind::Branch,
        _ => RobKind::Arith,
    };
    let state = if op == Opcode::Nop {
        // NOP does no work; it is complete the moment it is dispatched.
        RobState::Completed
    } else {
        RobState::Issued
    };
    let allocated = rob.allocate(RobEntry {
        kind,
        opcode: op,
        pc: token.pc,
        dest_ar: token.dest_ar,
        dest: token.dest,
        overwritten: token.overwritten,
        extra_overwritten: token.extra_overwritten,
        lsq_slot,
        state,
        flags: None,
    });
    debug_assert!(allocated.is_some(), "ROB full after admission check");

    if op.is_control_flow() {
        branches.push();
    }

    trace!(target: "apex::dispatch", pc = token.pc, op = %op, rob_slot, "dispatched");
    *dispatch_latch = None;
}

fn operand(src: Option<crate::common::PhysReg>, prf: &PhysRegFile) -> Operand {
    src.map_or(Operand::None, |tag| Operand::Reg {
        tag,
        ready: prf.is_ready(tag),
    })
}

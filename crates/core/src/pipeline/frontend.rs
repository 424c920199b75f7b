//! Front-end stages: Fetch and Decode/Rename.
//!
//! One instruction per cycle flows through two single-slot latches. A stage
//! runs only when its output latch is empty, so stalls propagate backward
//! without any explicit interlock flags. Fetch stops permanently once HALT
//! (or the end of the program) has been fetched.

use tracing::trace;

use crate::arch::CodeMemory;
use crate::common::ArchReg;
use crate::isa::Opcode;
use crate::pipeline::latches::{DispatchToken, FetchedInst};
use crate::pipeline::prf::PhysRegFile;
use crate::pipeline::rename::RenameTable;
use crate::stats::SimStats;

/// Fetch: reads the instruction at `pc` into the decode latch.
pub fn fetch_stage(
    pc: &mut u32,
    code: &CodeMemory,
    fetch_latch: &mut Option<FetchedInst>,
    fetch_done: &mut bool,
) {
    if *fetch_done || fetch_latch.is_some() {
        return;
    }
    let Some(inst) = code.fetch(*pc) else {
        // Ran off the end of the program; nothing more to feed.
        *fetch_done = true;
        return;
    };
    trace!(target: "apex::fetch", pc = *pc, %inst, "fetched");
    *fetch_latch = Some(FetchedInst {
        pc: *pc,
        inst: *inst,
    });
    if inst.opcode == Opcode::Halt {
        *fetch_done = true;
    }
    *pc += 4;
}

/// Decode/Rename: renames the instruction in the decode latch and moves it
/// into the dispatch latch.
///
/// The stage stalls whole when the free list cannot cover the instruction's
/// worst-case register need (unmapped sources to seed, a destination, and a
/// post-increment destination), so a rename never half-completes.
pub fn decode_rename_stage(
    fetch_latch: &mut Option<FetchedInst>,
    dispatch_latch: &mut Option<DispatchToken>,
    rename: &mut RenameTable,
    prf: &mut PhysRegFile,
    stats: &mut SimStats,
) {
    if dispatch_latch.is_some() {
        return; // downstream stall
    }
    let Some(fetched) = *fetch_latch else {
        return;
    };
    let inst = fetched.inst;

    if prf.free_len() < registers_needed(&fetched, rename) {
        stats.rename_stalls += 1;
        trace!(target: "apex::rename", pc = fetched.pc, "free list dry, stalling");
        return;
    }

    // Sources resolve against the pre-instruction map; the destination (and
    // post-increment base) rename afterwards, so an instruction reading its
    // own destination sees the previous producer.
    let Some(src1) = lookup(inst.rs1, rename, prf) else {
        return;
    };
    let Some(src2) = lookup(inst.rs2, rename, prf) else {
        return;
    };

    let mut dest = None;
    let mut overwritten = None;
    if let Some(rd) = inst.rd {
        let Some((new, old)) = rename.rename_dst(rd, prf) else {
            return;
        };
        dest = Some(new);
        overwritten = old;
    }

    let mut base_ar = None;
    let mut extra_dest = None;
    let mut extra_overwritten = None;
    if inst.opcode.is_post_increment() {
        let base = match inst.opcode {
            Opcode::Loadp => inst.rs1,
            _ => inst.rs2,
        };
        if let Some(ar) = base {
            let Some((new, old)) = rename.rename_dst(ar, prf) else {
                return;
            };
            base_ar = Some(ar);
            extra_dest = Some(new);
            extra_overwritten = old;
        }
    }

    trace!(
        target: "apex::rename",
        pc = fetched.pc,
        ?src1,
        ?src2,
        ?dest,
        ?overwritten,
        "renamed"
    );

    *dispatch_latch = Some(DispatchToken {
        pc: fetched.pc,
        opcode: inst.opcode,
        imm: inst.imm,
        src1,
        src2,
        dest_ar: inst.rd,
        dest,
        overwritten,
        base_ar,
        extra_dest,
        extra_overwritten,
    });
    *fetch_latch = None;
}

/// Worst-case physical registers this instruction consumes at rename.
fn registers_needed(fetched: &FetchedInst, rename: &RenameTable) -> usize {
    let inst = fetched.inst;
    let mut srcs: [Option<ArchReg>; 2] = [inst.rs1, inst.rs2];
    if srcs[0] == srcs[1] {
        srcs[1] = None; // one seed covers both reads
    }
    let unmapped = srcs
        .iter()
        .flatten()
        .filter(|&&ar| rename.current(ar).is_none())
        .count();

    let mut needed = unmapped;
    if inst.rd.is_some() {
        needed += 1;
    }
    if inst.opcode.is_post_increment() {
        needed += 1;
    }
    needed
}

fn lookup(
    ar: Option<ArchReg>,
    rename: &mut RenameTable,
    prf: &mut PhysRegFile,
) -> Option<Option<crate::common::PhysReg>> {
    match ar {
        None => Some(None),
        Some(ar) => rename.lookup_src(ar, prf).map(Some),
    }
}

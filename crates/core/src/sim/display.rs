//! State display helpers for the interactive shell.
//!
//! Renders the architectural and physical register files, the rename map,
//! and every pipeline structure as plain text. All functions return strings;
//! the shell decides where they go.

use std::fmt::Write as _;

use crate::pipeline::iq::{IqDest, Operand};
use crate::sim::simulator::Simulator;

/// Architectural registers, flags, rename map, PRF, and free-list size.
pub fn register_report(sim: &Simulator) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "----------\nRegisters:\n----------");

    let half = sim.arch.len() / 2;
    for (i, chunk) in [(0, half), (half, sim.arch.len())] {
        for r in i..chunk {
            let _ = write!(out, "R{r:<3}[{:<6}] ", sim.reg(r));
        }
        let _ = writeln!(out);
    }
    let flags = sim.flags();
    let _ = writeln!(
        out,
        "Z: {}  P: {}  N: {}",
        u8::from(flags.zero),
        u8::from(flags.positive),
        u8::from(flags.negative)
    );

    let _ = writeln!(out, "\nRename map:");
    for (ar, mapping) in sim.rename.iter() {
        if let Some(pr) = mapping {
            let _ = write!(out, "{ar}->{pr} ");
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "\nPhysical registers (free: {}):", sim.prf.free_len());
    for (pr, state) in sim.prf.iter() {
        let marker = if state.ready { ' ' } else { '*' };
        let _ = write!(out, "{pr}[{}{marker}] ", state.value);
        if (pr.0 + 1) % 8 == 0 {
            let _ = writeln!(out);
        }
    }
    let _ = writeln!(out);
    out
}

/// Front-end latches, functional units, IQ, LSQ, and ROB contents.
pub fn pipeline_report(sim: &Simulator) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Clock: {}", sim.clock);

    match &sim.fetch_latch {
        Some(f) => {
            let _ = writeln!(out, "{:<14}: pc({}) {}", "Fetch", f.pc, f.inst);
        }
        None => {
            let _ = writeln!(out, "{:<14}: empty", "Fetch");
        }
    }
    match &sim.dispatch_latch {
        Some(t) => {
            let _ = writeln!(out, "{:<14}: pc({}) {}", "Decode/Rename", t.pc, t.opcode);
        }
        None => {
            let _ = writeln!(out, "{:<14}: empty", "Decode/Rename");
        }
    }

    for unit in [&sim.int_fu, &sim.mul_fu, &sim.agen_fu] {
        let name = format!("{} FU", unit.kind());
        match unit.current() {
            Some(op) => {
                let _ = writeln!(out, "{name:<14}: pc({}) {}", op.pc, op.op);
            }
            None => {
                let _ = writeln!(out, "{name:<14}: idle");
            }
        }
    }

    let _ = writeln!(out, "\nIQ ({}/{}):", sim.iq.len(), sim.iq.capacity());
    for entry in sim.iq.iter() {
        let _ = writeln!(
            out,
            "  pc({}) {} [{}] src1={} src2={} dest={}",
            entry.pc,
            entry.op,
            entry.fu,
            operand_str(&entry.src1),
            operand_str(&entry.src2),
            dest_str(&entry.dest),
        );
    }

    let _ = writeln!(out, "LSQ ({}/{}):", sim.lsq.len(), sim.lsq.capacity());
    for (slot, entry) in sim.lsq.iter_in_order() {
        let addr = entry
            .addr
            .map_or_else(|| "?".to_string(), |a| a.to_string());
        let _ = writeln!(
            out,
            "  {slot} pc({}) {} addr={addr} data={}",
            entry.pc,
            entry.op,
            operand_str(&entry.data),
        );
    }

    let _ = writeln!(out, "ROB ({}/{}):", sim.rob.len(), sim.rob.capacity());
    for (slot, entry) in sim.rob.iter_in_order() {
        let _ = writeln!(
            out,
            "  [{slot}] pc({}) {} {:?}",
            entry.pc, entry.opcode, entry.state
        );
    }

    out
}

/// Non-zero data memory words.
pub fn memory_report(sim: &Simulator) -> String {
    let mut out = String::new();
    for (addr, value) in sim.mem.non_zero_words() {
        let _ = write!(out, "MEM[{addr}]: {value}  ");
    }
    let _ = writeln!(out);
    out
}

fn operand_str(op: &Operand) -> String {
    match op {
        Operand::None => "-".to_string(),
        Operand::Reg { tag, ready } => {
            format!("{tag}{}", if *ready { "" } else { "*" })
        }
    }
}

fn dest_str(dest: &IqDest) -> String {
    match dest {
        IqDest::None => "-".to_string(),
        IqDest::Preg(pr) => pr.to_string(),
        IqDest::Lsq(slot) => slot.to_string(),
    }
}

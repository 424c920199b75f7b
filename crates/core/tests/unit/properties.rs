//! Machine-level invariant properties.
//!
//! Random well-formed programs (every source register written before read)
//! are run to HALT; the out-of-order machine must agree with the sequential
//! reference interpreter, conserve physical registers, and keep the LSQ in
//! program order at every cycle.

use proptest::prelude::*;

use apex_core::config::Config;
use apex_core::isa::asm;
use apex_core::sim::Simulator;

use crate::common::interpreter;

/// One generated instruction line of a register-only program.
fn alu_line(written: &[usize]) -> impl Strategy<Value = String> {
    let sources = written.to_vec();
    let src = prop::sample::select(sources);
    let dst = 1usize..8;
    prop_oneof![
        (dst.clone(), -99i32..100).prop_map(|(d, imm)| format!("MOVC R{d},#{imm}")),
        (dst.clone(), src.clone(), src.clone())
            .prop_map(|(d, a, b)| format!("ADD R{d},R{a},R{b}")),
        (dst, src.clone(), src).prop_map(|(d, a, b)| format!("SUB R{d},R{a},R{b}")),
    ]
}

/// A well-formed MOVC/ADD/SUB program: seeds R1-R3, then random ops over
/// already-written registers, then HALT.
fn alu_program() -> impl Strategy<Value = String> {
    (prop::collection::vec(-99i32..100, 3), 0usize..20).prop_flat_map(|(seeds, len)| {
        let mut lines = Vec::new();
        for (i, value) in seeds.iter().enumerate() {
            lines.push(format!("MOVC R{},#{}", i + 1, value));
        }
        // Sources are drawn from the seeded registers only, so no operation
        // reads an unwritten register.
        let written: Vec<usize> = (1..=3).collect();
        prop::collection::vec(alu_line(&written), len).prop_map(move |body| {
            let mut program = lines.clone();
            program.extend(body);
            program.push("HALT".to_string());
            program.join("\n")
        })
    })
}

/// A store/load program over a small window of addresses based at R1 = 0.
fn memory_program() -> impl Strategy<Value = String> {
    prop::collection::vec((2usize..6, 0i32..8, prop::bool::ANY), 1..12).prop_map(|ops| {
        let mut lines = vec![
            "MOVC R1,#0".to_string(),
            "MOVC R2,#21".to_string(),
            "MOVC R3,#22".to_string(),
            "MOVC R4,#23".to_string(),
            "MOVC R5,#24".to_string(),
        ];
        for (reg, offset, is_store) in ops {
            if is_store {
                lines.push(format!("STORE R{reg},R1,#{offset}"));
            } else {
                lines.push(format!("LOAD R{reg},R1,#{offset}"));
            }
        }
        lines.push("HALT".to_string());
        lines.join("\n")
    })
}

fn run_machine(source: &str, config: &Config) -> Simulator {
    let mut sim = Simulator::from_source(source, config).unwrap();
    // Check cycle-by-cycle invariants while running.
    let mut guard = 0u64;
    while !sim.is_halted() {
        sim.tick();
        check_register_conservation(&sim);
        check_lsq_program_order(&sim);
        guard += 1;
        assert!(guard < 50_000, "machine failed to halt");
    }
    sim
}

/// Register conservation: every physical register is in exactly one of: the free list, the
/// rename map, or an in-flight `overwritten` slot (ROB entry or the token
/// still sitting in the dispatch latch).
fn check_register_conservation(sim: &Simulator) {
    let mapped = sim.rename.mapped_count();
    let in_rob: usize = sim
        .rob
        .iter_in_order()
        .map(|(_, e)| usize::from(e.overwritten.is_some()) + usize::from(e.extra_overwritten.is_some()))
        .sum();
    let in_latch = sim.dispatch_latch.map_or(0, |t| {
        usize::from(t.overwritten.is_some()) + usize::from(t.extra_overwritten.is_some())
    });
    assert_eq!(
        sim.prf.free_len() + mapped + in_rob + in_latch,
        sim.prf.capacity(),
        "physical register leaked or double-owned at cycle {}",
        sim.clock
    );
}

/// Memory ordering: LSQ entries are in program order (their PCs strictly increase from
/// head to tail) at every cycle.
fn check_lsq_program_order(sim: &Simulator) {
    let pcs: Vec<u32> = sim.lsq.iter_in_order().map(|(_, e)| e.pc).collect();
    assert!(
        pcs.windows(2).all(|w| w[0] < w[1]),
        "LSQ out of program order: {pcs:?}"
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Round-trip: the OoO machine's registers at HALT equal sequential
    /// interpretation, for arbitrary MOVC/ADD/SUB programs.
    #[test]
    fn alu_programs_match_sequential_interpretation(source in alu_program()) {
        let config = Config::default();
        let sim = run_machine(&source, &config);

        let program = asm::parse_program(&source, config.machine.reg_file_size).unwrap();
        let reference = interpreter::run(&program, &config);
        for r in 0..config.machine.reg_file_size {
            prop_assert_eq!(
                sim.reg(r),
                reference.regs[r],
                "R{} diverged for program:\n{}",
                r,
                source
            );
        }
    }

    /// Store atomicity: the final value of every touched word equals the last committed
    /// store to it in program order, and loads agree with the interpreter.
    #[test]
    fn memory_programs_match_sequential_interpretation(source in memory_program()) {
        let config = Config::default();
        let sim = run_machine(&source, &config);

        let program = asm::parse_program(&source, config.machine.reg_file_size).unwrap();
        let reference = interpreter::run(&program, &config);
        for addr in 0..8 {
            prop_assert_eq!(sim.mem_word(addr), reference.mem[addr as usize]);
        }
        for r in 0..config.machine.reg_file_size {
            prop_assert_eq!(sim.reg(r), reference.regs[r]);
        }
    }

    /// Boundary composition: a one-slot IQ only slows the machine down.
    #[test]
    fn tiny_issue_queue_preserves_results(source in alu_program()) {
        let mut small = Config::default();
        small.machine.iq_size = 1;
        let config = Config::default();

        let sim_small = run_machine(&source, &small);
        let sim_big = run_machine(&source, &config);
        for r in 0..config.machine.reg_file_size {
            prop_assert_eq!(sim_small.reg(r), sim_big.reg(r));
        }
    }
}

//! End-to-end scenarios: architectural state at HALT.

use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::harness::TestContext;

#[test]
fn independent_movc_then_add() {
    let mut ctx = TestContext::assemble("MOVC R1,#5\nMOVC R2,#7\nADD R3,R1,R2\nHALT\n");
    ctx.run_to_halt();
    assert_eq!(ctx.reg(1), 5);
    assert_eq!(ctx.reg(2), 7);
    assert_eq!(ctx.reg(3), 12);
}

#[test]
fn multiply_feeds_dependent_literal_add() {
    let mut ctx = TestContext::assemble("MOVC R1,#3\nMOVC R2,#4\nMUL R3,R1,R2\nADDL R4,R3,#1\nHALT\n");
    ctx.run_to_halt();
    assert_eq!(ctx.reg(3), 12);
    assert_eq!(ctx.reg(4), 13);
}

#[test]
fn store_then_load_same_address() {
    let mut ctx =
        TestContext::assemble("MOVC R1,#100\nMOVC R2,#42\nSTORE R2,R1,#0\nLOAD R3,R1,#0\nHALT\n");
    ctx.run_to_halt();
    assert_eq!(ctx.mem(100), 42);
    assert_eq!(ctx.reg(3), 42);
}

#[test]
fn post_increment_store() {
    let mut ctx = TestContext::assemble("MOVC R1,#200\nMOVC R2,#9\nSTOREP R2,R1,#0\nHALT\n");
    ctx.run_to_halt();
    assert_eq!(ctx.mem(200), 9);
    assert_eq!(ctx.reg(1), 204);
}

#[test]
fn post_increment_load_walks_memory() {
    let mut ctx = TestContext::assemble(
        "MOVC R1,#10\nMOVC R2,#11\nMOVC R3,#8\nSTORE R1,R3,#0\nSTORE R2,R3,#4\n\
         LOADP R4,R3,#0\nLOADP R5,R3,#0\nHALT\n",
    );
    ctx.run_to_halt();
    // LOADP advances the base by a word (4) each time.
    assert_eq!(ctx.reg(4), 10);
    assert_eq!(ctx.reg(5), 11);
    assert_eq!(ctx.reg(3), 16);
}

#[test]
fn serial_add_chain_renames_each_write() {
    let mut ctx =
        TestContext::assemble("MOVC R1,#1\nADD R1,R1,R1\nADD R1,R1,R1\nADD R1,R1,R1\nHALT\n");
    ctx.run_to_halt();
    assert_eq!(ctx.reg(1), 8);

    // Every committed overwrite returned its register: free + mapped = total.
    assert_eq!(
        ctx.sim.prf.free_len() + ctx.sim.rename.mapped_count(),
        ctx.sim.prf.capacity()
    );
}

#[rstest]
#[case("AND", 0b1100, 0b1010, 0b1000)]
#[case("OR", 0b1100, 0b1010, 0b1110)]
#[case("XOR", 0b1100, 0b1010, 0b0110)]
#[case("SUB", 10, 3, 7)]
fn two_source_alu_ops(#[case] op: &str, #[case] a: i32, #[case] b: i32, #[case] want: i32) {
    let mut ctx = TestContext::assemble(&format!(
        "MOVC R1,#{a}\nMOVC R2,#{b}\n{op} R3,R1,R2\nHALT\n"
    ));
    ctx.run_to_halt();
    assert_eq!(ctx.reg(3), want);
}

#[rstest]
#[case(5, 5, true, false, false)] // equal -> Z
#[case(7, 5, false, true, false)] // greater -> P
#[case(3, 5, false, false, true)] // less -> N
fn compare_sets_flags(
    #[case] a: i32,
    #[case] b: i32,
    #[case] zero: bool,
    #[case] positive: bool,
    #[case] negative: bool,
) {
    let mut ctx = TestContext::assemble(&format!("MOVC R1,#{a}\nMOVC R2,#{b}\nCMP R1,R2\nHALT\n"));
    ctx.run_to_halt();
    let flags = ctx.sim.flags();
    assert_eq!(flags.zero, zero);
    assert_eq!(flags.positive, positive);
    assert_eq!(flags.negative, negative);
}

#[test]
fn compare_literal_sets_flags() {
    let mut ctx = TestContext::assemble("MOVC R1,#5\nCML R1,#9\nHALT\n");
    ctx.run_to_halt();
    assert!(ctx.sim.flags().negative);
}

#[test]
fn declared_branches_retire_without_redirecting() {
    // Control flow is decoded, renamed, and retired, but never redirects:
    // the instruction after the branch executes regardless.
    let mut ctx = TestContext::assemble("MOVC R1,#1\nBZ #8\nMOVC R2,#2\nHALT\n");
    ctx.run_to_halt();
    assert_eq!(ctx.reg(2), 2);
    assert_eq!(ctx.sim.stats.inst_branch, 1);
}

#[test]
fn jalr_writes_its_link_address() {
    let mut ctx = TestContext::assemble("MOVC R1,#0\nJALR R2,R1,#0\nHALT\n");
    ctx.run_to_halt();
    // JALR sits at 4004; the link value is the next sequential pc.
    assert_eq!(ctx.reg(2), 4008);
}

#[test]
fn unwritten_source_reads_the_seeded_value() {
    // R9 was never written; its seeded physical register holds the PRF
    // initial value (-1), which propagates as data.
    let mut ctx = TestContext::assemble("ADD R1,R9,R9\nHALT\n");
    ctx.run_to_halt();
    assert_eq!(ctx.reg(1), -2);
}

#[test]
fn retires_every_instruction_including_nop_and_halt() {
    let mut ctx = TestContext::assemble("NOP\nMOVC R1,#1\nNOP\nHALT\n");
    ctx.run_to_halt();
    assert_eq!(ctx.sim.stats.instructions_retired, 4);
    assert_eq!(ctx.sim.stats.inst_nop, 2);
}

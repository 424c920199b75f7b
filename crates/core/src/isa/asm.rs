//! Text assembly parser.
//!
//! Programs are plain text, one instruction per line, operands separated by
//! commas or whitespace: `ADD R3,R1,R2`, `MOVC R1,#5`, `STORE R2, R1, #0`.
//! Blank lines and `;` comments are ignored. Mnemonics and register names are
//! case-insensitive.

use crate::common::{ArchReg, SimError};
use crate::isa::instruction::Instruction;
use crate::isa::opcode::{Format, Opcode};

/// Parses a full program listing into instructions.
///
/// Returns `SimError::UnknownRegister` for a malformed or out-of-range
/// register operand, `SimError::BadInstruction` (with line and text) for any
/// other malformed line, or `SimError::EmptyProgram` if nothing parsed.
pub fn parse_program(source: &str, reg_file_size: usize) -> Result<Vec<Instruction>, SimError> {
    let mut program = Vec::new();
    for (idx, raw) in source.lines().enumerate() {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }
        let inst = parse_line(line, reg_file_size).map_err(|err| match err {
            SimError::BadInstruction { text, reason, .. } => SimError::BadInstruction {
                line: idx + 1,
                text,
                reason,
            },
            other => other,
        })?;
        program.push(inst);
    }
    if program.is_empty() {
        return Err(SimError::EmptyProgram);
    }
    Ok(program)
}

/// Parses a single instruction line (comment already stripped).
///
/// Register operand problems surface as `SimError::UnknownRegister`; other
/// problems as `SimError::BadInstruction` with a zero line number, which
/// `parse_program` replaces with the real one.
pub fn parse_line(line: &str, reg_file_size: usize) -> Result<Instruction, SimError> {
    let bad = |reason: String| SimError::BadInstruction {
        line: 0,
        text: line.to_string(),
        reason,
    };

    let mut tokens = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty());

    let mnemonic = tokens
        .next()
        .ok_or_else(|| bad("missing mnemonic".to_string()))?;
    let opcode = Opcode::from_mnemonic(mnemonic)
        .ok_or_else(|| bad(format!("unknown opcode '{mnemonic}'")))?;

    let operands: Vec<&str> = tokens.collect();
    let mut inst = Instruction {
        opcode,
        rd: None,
        rs1: None,
        rs2: None,
        imm: None,
    };

    let expect = |n: usize| -> Result<(), SimError> {
        if operands.len() == n {
            Ok(())
        } else {
            Err(bad(format!(
                "expected {} operand(s), found {}",
                n,
                operands.len()
            )))
        }
    };

    match opcode.format() {
        Format::RegRegReg => {
            expect(3)?;
            inst.rd = Some(parse_reg(operands[0], reg_file_size)?);
            inst.rs1 = Some(parse_reg(operands[1], reg_file_size)?);
            inst.rs2 = Some(parse_reg(operands[2], reg_file_size)?);
        }
        Format::RegRegImm => {
            expect(3)?;
            inst.rd = Some(parse_reg(operands[0], reg_file_size)?);
            inst.rs1 = Some(parse_reg(operands[1], reg_file_size)?);
            inst.imm = Some(parse_imm(operands[2]).map_err(&bad)?);
        }
        Format::RegImm => {
            expect(2)?;
            inst.rd = Some(parse_reg(operands[0], reg_file_size)?);
            inst.imm = Some(parse_imm(operands[1]).map_err(&bad)?);
        }
        Format::SrcSrcImm => {
            expect(3)?;
            inst.rs1 = Some(parse_reg(operands[0], reg_file_size)?);
            inst.rs2 = Some(parse_reg(operands[1], reg_file_size)?);
            inst.imm = Some(parse_imm(operands[2]).map_err(&bad)?);
        }
        Format::SrcSrc => {
            expect(2)?;
            inst.rs1 = Some(parse_reg(operands[0], reg_file_size)?);
            inst.rs2 = Some(parse_reg(operands[1], reg_file_size)?);
        }
        Format::SrcImm => {
            expect(2)?;
            inst.rs1 = Some(parse_reg(operands[0], reg_file_size)?);
            inst.imm = Some(parse_imm(operands[1]).map_err(&bad)?);
        }
        Format::Imm => {
            expect(1)?;
            inst.imm = Some(parse_imm(operands[0]).map_err(&bad)?);
        }
        Format::Bare => {
            expect(0)?;
        }
    }

    Ok(inst)
}

/// Parses `R<n>` (case-insensitive) and range-checks against the register
/// file. Anything that is not a valid in-range register name is an
/// `UnknownRegister`.
fn parse_reg(token: &str, reg_file_size: usize) -> Result<ArchReg, SimError> {
    let idx: usize = token
        .strip_prefix('R')
        .or_else(|| token.strip_prefix('r'))
        .and_then(|body| body.parse().ok())
        .ok_or_else(|| SimError::UnknownRegister(token.to_string()))?;
    if idx >= reg_file_size {
        return Err(SimError::UnknownRegister(token.to_string()));
    }
    Ok(ArchReg(idx))
}

/// Parses `#imm` (the `#` is optional) as a signed 32-bit literal.
fn parse_imm(token: &str) -> Result<i32, String> {
    let body = token.strip_prefix('#').unwrap_or(token);
    body.parse()
        .map_err(|_| format!("bad literal '{token}'"))
}

fn strip_comment(line: &str) -> &str {
    line.split(';').next().unwrap_or(line)
}

//! Operand and ALU helpers shared by the step function.

use crate::decoder::DecodedInstruction;
use crate::encoding::{Format, Opcode};
use crate::state::CpuState;

/// Second operand: `rs` for register form, the latched immediate otherwise.
#[must_use]
pub fn operand(instr: &DecodedInstruction, state: &CpuState) -> u16 {
    if instr.format == Format::Rr {
        state.regs[instr.rs]
    } else {
        state.latch.widen(instr.imm)
    }
}

/// Effective address of a load or store: `rs + offset`, wrapping.
#[must_use]
pub fn effective_address(instr: &DecodedInstruction, state: &CpuState) -> u16 {
    state.regs[instr.rs].wrapping_add(state.latch.offset(instr.imm))
}

/// Reinterprets a word as two's complement.
#[must_use]
pub const fn signed(value: u16) -> i16 {
    i16::from_ne_bytes(value.to_ne_bytes())
}

/// Result of an in-place ALU opcode, `None` for anything else.
#[must_use]
pub const fn alu(opcode: Opcode, lhs: u16, rhs: u16) -> Option<u16> {
    let shift = (rhs & 0xF) as u32;
    let value = match opcode {
        Opcode::Move => rhs,
        Opcode::Add => lhs.wrapping_add(rhs),
        Opcode::Sub => lhs.wrapping_sub(rhs),
        Opcode::Xor => lhs ^ rhs,
        Opcode::And => lhs & rhs,
        Opcode::Or => lhs | rhs,
        Opcode::Shl => lhs << shift,
        Opcode::Shr => lhs >> shift,
        Opcode::Asr => u16::from_ne_bytes((signed(lhs) >> shift).to_ne_bytes()),
        _ => return None,
    };
    Some(value)
}

/// Whether a compare-and-skip opcode's predicate holds.
///
/// The following instruction is skipped when this returns `false`.
#[must_use]
pub const fn condition_holds(opcode: Opcode, lhs: u16, rhs: u16) -> bool {
    match opcode {
        Opcode::IfEq => lhs == rhs,
        Opcode::IfNe => lhs != rhs,
        Opcode::IfLt => signed(lhs) < signed(rhs),
        Opcode::IfGe => signed(lhs) >= signed(rhs),
        Opcode::IfUlt => lhs < rhs,
        Opcode::IfUge => lhs >= rhs,
        _ => true,
    }
}

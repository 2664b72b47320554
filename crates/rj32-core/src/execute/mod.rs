//! Instruction execution engine.
//!
//! One call to [`step`] executes the instruction at `pc` and then applies the
//! end-of-step protocol in a fixed order:
//! 1. Decay the immediate latch unless this step loaded it
//! 2. Advance `pc`
//! 3. Consume a pending skip, stepping over an `imm` prefix as well
//! 4. Count the retired cycle
//!
//! `halt` and `error` stop before the protocol runs, so neither `pc` nor the
//! cycle counter moves.

/// Operand and ALU helpers.
pub mod helpers;
mod program;

pub use program::ProgramMemory;

use crate::decoder::{DecodedInstruction, Register};
use crate::encoding::{Format, Opcode};
use crate::fault::ExecFault;
use crate::memory::Bus;
use crate::state::{CpuState, RunState};
use crate::trace::{TraceEffect, TraceEvent, TraceSink};

use helpers::{alu, condition_holds, effective_address, operand};

/// Exit code reported when the cycle budget runs out.
pub const CYCLE_LIMIT_EXIT_CODE: i32 = 1;

/// Outcome of a single [`step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum StepOutcome {
    /// The instruction retired and execution can continue.
    Retired,
    /// The program executed `halt`.
    Halted,
    /// The program executed `error`.
    Errored {
        /// Nonzero exit code.
        code: u16,
    },
}

/// Outcome of a bounded [`run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunOutcome {
    /// The program executed `halt`.
    Halted,
    /// The program executed `error`.
    Errored {
        /// Nonzero exit code.
        code: u16,
    },
    /// The budget was exhausted before the program terminated.
    CycleLimitReached,
}

impl RunOutcome {
    /// Process exit code: `0` on halt, the error code, or
    /// [`CYCLE_LIMIT_EXIT_CODE`].
    #[must_use]
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Halted => 0,
            Self::Errored { code } => i32::from(code),
            Self::CycleLimitReached => CYCLE_LIMIT_EXIT_CODE,
        }
    }
}

/// Exit code carried by `error`: `a0` when nonzero, else 1.
const fn error_code(state: &CpuState) -> u16 {
    match state.regs.get(Register::A0) {
        0 => 1,
        code => code,
    }
}

/// Executes the instruction at `state.pc`.
///
/// Once the machine has halted or errored, the terminal outcome is returned
/// again without executing anything.
///
/// # Errors
///
/// Returns [`ExecFault::UnknownOpcode`] for opcodes with no behaviour and
/// [`ExecFault::Bus`] when a load or store is not accepted. The state is
/// left as it was before the faulting instruction, apart from any device
/// side effects.
pub fn step(
    state: &mut CpuState,
    program: &ProgramMemory,
    bus: &mut Bus,
    trace: &mut dyn TraceSink,
) -> Result<StepOutcome, ExecFault> {
    match state.run_state {
        RunState::Halted => return Ok(StepOutcome::Halted),
        RunState::Errored { code } => return Ok(StepOutcome::Errored { code }),
        RunState::Running | RunState::CycleLimitReached => {
            state.run_state = RunState::Running;
        }
    }

    let pc = state.pc;
    let instr = program.fetch(pc);
    trace.on_event(TraceEvent::Before {
        pc,
        instruction: instr,
        rd_value: state.regs[instr.rd],
        rs_value: state.regs[instr.rs],
        operand: operand(&instr, state),
        offset: state.latch.offset(instr.imm),
    });

    let effect = match instr.opcode {
        Opcode::Halt => {
            state.run_state = RunState::Halted;
            return Ok(StepOutcome::Halted);
        }
        Opcode::Error => {
            let code = error_code(state);
            state.run_state = RunState::Errored { code };
            return Ok(StepOutcome::Errored { code });
        }
        _ => execute(&instr, state, bus)?,
    };

    trace.on_event(TraceEvent::After {
        pc,
        instruction: instr,
        effect,
    });

    state.latch.decay();
    state.pc = state.pc.wrapping_add(1);
    if state.skip {
        if program.fetch(state.pc).opcode.is_immediate_prefix() {
            state.pc = state.pc.wrapping_add(1);
        }
        state.pc = state.pc.wrapping_add(1);
        state.skip = false;
    }
    state.cycles += 1;
    Ok(StepOutcome::Retired)
}

/// Applies one non-terminal instruction to `state`, returning its effect.
fn execute(
    instr: &DecodedInstruction,
    state: &mut CpuState,
    bus: &mut Bus,
) -> Result<TraceEffect, ExecFault> {
    let pc = state.pc;
    let rhs = operand(instr, state);
    let effect = match instr.opcode {
        Opcode::Nop => TraceEffect::None,
        Opcode::Rcsr => {
            state.pc = state.regs[instr.rd];
            TraceEffect::Jump {
                target: state.pc.wrapping_add(1),
            }
        }
        Opcode::Imm | Opcode::Imm2 => {
            state.latch.load(rhs);
            TraceEffect::Latch {
                value: state.latch.value,
            }
        }
        Opcode::Call | Opcode::Jump => {
            if instr.opcode == Opcode::Call {
                state.regs[Register::Ra] = pc;
            }
            state.pc = if instr.format == Format::Rr {
                state.regs[instr.rs]
            } else {
                pc.wrapping_add(rhs)
            };
            TraceEffect::Jump {
                target: state.pc.wrapping_add(1),
            }
        }
        Opcode::Load => {
            let address = effective_address(instr, state);
            let value = bus
                .read(address)
                .map_err(|source| ExecFault::Bus { pc, source })?;
            state.regs[instr.rd] = value;
            TraceEffect::Load {
                reg: instr.rd,
                value,
                address,
            }
        }
        Opcode::Store => {
            let address = effective_address(instr, state);
            let value = state.regs[instr.rd];
            bus.write(address, value)
                .map_err(|source| ExecFault::Bus { pc, source })?;
            TraceEffect::Store { address, value }
        }
        opcode if opcode.is_conditional() => {
            state.skip = !condition_holds(opcode, state.regs[instr.rd], rhs);
            TraceEffect::Skip(state.skip)
        }
        opcode => {
            let Some(value) = alu(opcode, state.regs[instr.rd], rhs) else {
                return Err(ExecFault::UnknownOpcode { opcode, pc });
            };
            state.regs[instr.rd] = value;
            TraceEffect::Register {
                reg: instr.rd,
                value,
            }
        }
    };
    Ok(effect)
}

/// Steps until the program terminates or `budget` instructions retire.
///
/// A run that exhausts its budget leaves the machine resumable: calling
/// `run` again continues from the saved state.
///
/// # Errors
///
/// Propagates the first [`ExecFault`] raised by [`step`].
pub fn run(
    state: &mut CpuState,
    program: &ProgramMemory,
    bus: &mut Bus,
    trace: &mut dyn TraceSink,
    budget: u64,
) -> Result<RunOutcome, ExecFault> {
    for _ in 0..budget {
        match step(state, program, bus, trace)? {
            StepOutcome::Retired => {}
            StepOutcome::Halted => return Ok(RunOutcome::Halted),
            StepOutcome::Errored { code } => return Ok(RunOutcome::Errored { code }),
        }
    }
    match state.run_state {
        RunState::Halted => Ok(RunOutcome::Halted),
        RunState::Errored { code } => Ok(RunOutcome::Errored { code }),
        RunState::Running | RunState::CycleLimitReached => {
            state.run_state = RunState::CycleLimitReached;
            Ok(RunOutcome::CycleLimitReached)
        }
    }
}

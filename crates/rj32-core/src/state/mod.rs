//! Machine state threaded through the execution engine.

/// Register file and immediate latch.
pub mod registers;
/// Run-state machine.
pub mod run_state;

pub use registers::{ImmediateLatch, RegisterFile};
pub use run_state::RunState;

/// Complete CPU state for one emulation run.
///
/// Created once per run and mutated only by [`crate::execute::step`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CpuState {
    /// General registers.
    pub regs: RegisterFile,
    /// Index into program memory of the next instruction.
    pub pc: u16,
    /// Set by a failed comparison; consumed at the end of the same step.
    pub skip: bool,
    /// Immediate-extension latch.
    pub latch: ImmediateLatch,
    /// Current run state.
    pub run_state: RunState,
    /// Instructions retired since power-on.
    pub cycles: u64,
}

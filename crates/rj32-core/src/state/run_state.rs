/// Execution state machine.
///
/// `Halted` and `Errored` are terminal; `CycleLimitReached` only records
/// that the last run call ran out of budget and the machine may be resumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunState {
    /// Ready to execute the next instruction.
    #[default]
    Running,
    /// Stopped by `halt`.
    Halted,
    /// Stopped by `error` with the given exit code.
    Errored {
        /// Nonzero exit code derived from `a0`.
        code: u16,
    },
    /// The previous run exhausted its cycle budget.
    CycleLimitReached,
}

impl RunState {
    /// True once the program has halted or raised an error.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Halted | Self::Errored { .. })
    }
}

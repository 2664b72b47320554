//! Host-facing configuration and the owned [`Machine`] wrapper.

use std::io::{self, Write};

use crate::execute::{self, ProgramMemory, RunOutcome, StepOutcome};
use crate::fault::{LoadError, MachineError};
use crate::memory::{default_bus, Bus, MEMORY_WORDS};
use crate::state::CpuState;
use crate::trace::{NoopTrace, TraceSink, WriterTrace};

/// Default instruction budget for a run.
pub const DEFAULT_MAX_CYCLES: u64 = 1_000_000;

/// Top-level configuration for one emulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MachineConfig {
    /// Instructions to retire before giving up.
    pub max_cycles: u64,
    /// Enables the text trace on stderr.
    pub trace: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            max_cycles: DEFAULT_MAX_CYCLES,
            trace: false,
        }
    }
}

/// CPU, program memory and bus bundled for hosts.
pub struct Machine {
    state: CpuState,
    program: ProgramMemory,
    bus: Bus,
    trace: Box<dyn TraceSink>,
}

impl Machine {
    /// Power-on machine attached to `bus`, with an empty program and no trace.
    #[must_use]
    pub fn new(bus: Bus) -> Self {
        Self {
            state: CpuState::default(),
            program: ProgramMemory::default(),
            bus,
            trace: Box::new(NoopTrace),
        }
    }

    /// Routes trace events to `sink`.
    #[must_use]
    pub fn with_trace(mut self, sink: impl TraceSink + 'static) -> Self {
        self.trace = Box::new(sink);
        self
    }

    /// Replaces program memory with `words`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::ProgramTooLarge`] for images over 65536 words.
    pub fn load_program(&mut self, words: &[u16]) -> Result<(), LoadError> {
        self.program = ProgramMemory::load(words)?;
        Ok(())
    }

    /// Writes `words` through the bus starting at address 0.
    ///
    /// # Errors
    ///
    /// Returns [`MachineError::Load`] for images over 65536 words and
    /// [`MachineError::Preload`] when a write is not accepted.
    pub fn load_data(&mut self, words: &[u16]) -> Result<(), MachineError> {
        if words.len() > MEMORY_WORDS {
            return Err(LoadError::DataTooLarge { words: words.len() }.into());
        }
        for (address, &word) in (0..=u16::MAX).zip(words) {
            self.bus.write(address, word).map_err(MachineError::Preload)?;
        }
        Ok(())
    }

    /// Executes one instruction.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::ExecFault`] from the engine.
    pub fn step(&mut self) -> Result<StepOutcome, MachineError> {
        Ok(execute::step(
            &mut self.state,
            &self.program,
            &mut self.bus,
            self.trace.as_mut(),
        )?)
    }

    /// Runs for at most `budget` instructions.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::ExecFault`] from the engine.
    pub fn run(&mut self, budget: u64) -> Result<RunOutcome, MachineError> {
        Ok(execute::run(
            &mut self.state,
            &self.program,
            &mut self.bus,
            self.trace.as_mut(),
            budget,
        )?)
    }

    /// Current CPU state.
    #[must_use]
    pub const fn state(&self) -> &CpuState {
        &self.state
    }

    /// The attached bus, for inspecting devices between steps.
    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }
}

impl std::fmt::Debug for Machine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("state", &self.state)
            .field("program", &self.program)
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}

/// Runs `program` against the default memory map, printing characters to
/// `output`, and returns how the run ended.
///
/// `data` is pre-loaded through the bus before execution starts. With
/// `config.trace` set, the text trace goes to stderr.
///
/// # Errors
///
/// Returns [`MachineError`] when either image does not load or execution
/// faults.
pub fn emulate(
    config: &MachineConfig,
    program: &[u16],
    data: &[u16],
    output: impl Write + 'static,
) -> Result<RunOutcome, MachineError> {
    let mut machine = Machine::new(default_bus(output));
    if config.trace {
        machine = machine.with_trace(WriterTrace::new(io::stderr()));
    }
    machine.load_program(program)?;
    machine.load_data(data)?;
    machine.run(config.max_cycles)
}

//! Structured execution trace.
//!
//! The engine reports two events per executed instruction: [`TraceEvent::Before`]
//! with the operands it is about to use and [`TraceEvent::After`] with the
//! architectural effect. Hosts pick a sink; [`WriterTrace`] renders the
//! classic two-line text trace.

use std::fmt;
use std::io::{self, Write};

use crate::decoder::{DecodedInstruction, Register};
use crate::encoding::Format;
use crate::execute::helpers::signed;

/// Architectural effect of one retired instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum TraceEffect {
    /// A register was written.
    Register {
        /// Destination register.
        reg: Register,
        /// New value.
        value: u16,
    },
    /// A comparison set or left the skip flag.
    Skip(bool),
    /// Control moved; `target` is the next instruction to execute.
    Jump {
        /// Address of the next instruction.
        target: u16,
    },
    /// The immediate latch was loaded.
    Latch {
        /// Latched value, already shifted.
        value: u16,
    },
    /// A register was loaded from the bus.
    Load {
        /// Destination register.
        reg: Register,
        /// Value read.
        value: u16,
        /// Effective address.
        address: u16,
    },
    /// A register was stored to the bus.
    Store {
        /// Effective address.
        address: u16,
        /// Value written.
        value: u16,
    },
    /// No visible effect.
    None,
}

/// Deterministic trace events emitted around each instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum TraceEvent {
    /// Emitted before execution with the operands the instruction sees.
    Before {
        /// Address of the instruction.
        pc: u16,
        /// Instruction about to execute.
        instruction: DecodedInstruction,
        /// Value of `rd`.
        rd_value: u16,
        /// Value of `rs`.
        rs_value: u16,
        /// Second operand after latch widening.
        operand: u16,
        /// Load-store offset after latch widening.
        offset: u16,
    },
    /// Emitted after execution, before the program counter advances.
    After {
        /// Address of the instruction.
        pc: u16,
        /// Instruction that executed.
        instruction: DecodedInstruction,
        /// What it changed.
        effect: TraceEffect,
    },
}

/// Sink trait for trace hooks.
pub trait TraceSink {
    /// Records an event in execution order.
    fn on_event(&mut self, event: TraceEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoopTrace;

impl TraceSink for NoopTrace {
    fn on_event(&mut self, _event: TraceEvent) {}
}

impl TraceSink for Vec<TraceEvent> {
    fn on_event(&mut self, event: TraceEvent) {
        self.push(event);
    }
}

/// Renders events as text lines to a writer.
///
/// ```text
/// 0000: move  a0, 5    (a0:0 rsval:5)
///   a0 <- 5
/// ```
///
/// The first write failure is kept and later events are dropped.
#[derive(Debug)]
pub struct WriterTrace<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> WriterTrace<W> {
    /// Wraps `out`.
    pub const fn new(out: W) -> Self {
        Self { out, error: None }
    }

    /// First write failure, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&io::Error> {
        self.error.as_ref()
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TraceSink for WriterTrace<W> {
    fn on_event(&mut self, event: TraceEvent) {
        if self.error.is_some() {
            return;
        }
        let result = match event {
            TraceEvent::Before { .. } => writeln!(self.out, "{}", BeforeLine(&event)),
            TraceEvent::After {
                effect: TraceEffect::None,
                ..
            } => Ok(()),
            TraceEvent::After { effect, .. } => writeln!(self.out, "  {}", EffectLine(effect)),
        };
        if let Err(err) = result {
            self.error = Some(err);
        }
    }
}

struct BeforeLine<'a>(&'a TraceEvent);

impl fmt::Display for BeforeLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let TraceEvent::Before {
            pc,
            instruction,
            rd_value,
            rs_value,
            operand,
            offset,
        } = *self.0
        else {
            return Ok(());
        };
        let rd = instruction.rd.name();
        let rs = instruction.rs.name();
        let text = instruction.to_string();
        write!(f, "{pc:04x}: {text:<15}")?;
        match instruction.format {
            Format::Rr => write!(
                f,
                "({rd}:{} {rs}:{})",
                signed(rd_value),
                signed(rs_value)
            ),
            Format::I11 => write!(f, "(pc:{pc:04x} rsval:{})", signed(operand)),
            Format::I12 => write!(f, "(rsval:{})", signed(operand)),
            Format::Ri6 | Format::Ri8 => {
                write!(f, "({rd}:{} rsval:{})", signed(rd_value), signed(operand))
            }
            Format::Ls => write!(f, "({rs}:{} off:{})", signed(rs_value), signed(offset)),
        }
    }
}

struct EffectLine(TraceEffect);

impl fmt::Display for EffectLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            TraceEffect::Register { reg, value } => write!(f, "{} <- {}", reg.name(), signed(value)),
            TraceEffect::Skip(skip) => write!(f, "skip <- {skip}"),
            TraceEffect::Jump { target } => write!(f, "pc <- {target:04x}"),
            TraceEffect::Latch { value } => write!(f, "imm <- {}", signed(value)),
            TraceEffect::Load {
                reg,
                value,
                address,
            } => write!(f, "{} <- {} <- mem[{address:04x}]", reg.name(), signed(value)),
            TraceEffect::Store { address, value } => {
                write!(f, "mem[{address:04x}] <- {}", signed(value))
            }
            TraceEffect::None => Ok(()),
        }
    }
}

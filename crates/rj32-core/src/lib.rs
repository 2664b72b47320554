//! Core emulator crate for the rj32 16-bit CPU.

/// Instruction formats, the opcode table and sign extension.
pub mod encoding;
pub use encoding::{
    sign_extend, Format, Opcode, CANONICAL_IMMEDIATE_BITS, CANONICAL_IMMEDIATE_MASK, OPCODE_TABLE,
};

/// Word decoder, register names and instruction packing helpers.
pub mod decoder;
pub use decoder::{
    decode, encode_i11, encode_i12, encode_ls, encode_ri6, encode_ri8, encode_rr,
    DecodedInstruction, Register, REGISTER_COUNT,
};

/// Assembler-syntax rendering of decoded instructions.
pub mod disasm;
pub use disasm::{disassemble, DisassemblyRow};

/// Error taxonomy for bus, load and execution failures.
pub mod fault;
pub use fault::{BusError, DeviceError, ExecFault, FaultClass, LoadError, MachineError};

/// Data bus and the standard memory map.
pub mod memory;
pub use memory::{
    default_bus, Bus, BusDevice, Mapping, Transaction, CHAR_OUT_ADDR, MEMORY_WORDS, RAM_BASE,
    RAM_SPAN,
};

/// Bus devices: RAM and the character-output port.
pub mod peripherals;
pub use peripherals::{CharOutput, Ram, CURSOR_RETURN};

/// CPU state model.
pub mod state;
pub use state::{CpuState, ImmediateLatch, RegisterFile, RunState};

/// Execution engine.
pub mod execute;
pub use execute::{run, step, ProgramMemory, RunOutcome, StepOutcome, CYCLE_LIMIT_EXIT_CODE};

/// Execution trace events and sinks.
pub mod trace;
pub use trace::{NoopTrace, TraceEffect, TraceEvent, TraceSink, WriterTrace};

/// Host-facing configuration and machine wrapper.
pub mod api;
pub use api::{emulate, Machine, MachineConfig, DEFAULT_MAX_CYCLES};

#[cfg(test)]
use proptest as _;

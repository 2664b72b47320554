use std::io;

use thiserror::Error;

use crate::encoding::Opcode;

/// Fault classes used when reporting a terminated run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultClass {
    /// Executed an opcode that has no defined behaviour.
    Execution,
    /// A bus transaction was not accepted, or a device failed.
    Bus,
    /// Program or data image could not be loaded.
    Load,
}

/// Failure reported by a bus device while handling an accepted transaction.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The device's host-side sink failed.
    #[error("device i/o failed: {0}")]
    Io(#[from] io::Error),
}

/// Bus transaction failures.
#[derive(Debug, Error)]
pub enum BusError {
    /// No attached device accepted the transaction.
    #[error("no device accepted {} at {address:#06x}", direction(.is_write))]
    Unmapped {
        /// Transaction address.
        address: u16,
        /// True for writes.
        is_write: bool,
    },
    /// The accepting device failed.
    #[error("device at {address:#06x} failed")]
    Device {
        /// Transaction address.
        address: u16,
        /// Underlying device failure.
        #[source]
        source: DeviceError,
    },
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn direction(is_write: &bool) -> &'static str {
    if *is_write {
        "write"
    } else {
        "read"
    }
}

/// Image loading failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum LoadError {
    /// Program image does not fit the 64 Ki-word program memory.
    #[error("program of {words} words exceeds program memory")]
    ProgramTooLarge {
        /// Supplied program length in words.
        words: usize,
    },
    /// Data image does not fit the address space.
    #[error("data image of {words} words exceeds the address space")]
    DataTooLarge {
        /// Supplied data length in words.
        words: usize,
    },
}

/// Fatal execution faults. A faulting run cannot be resumed.
#[derive(Debug, Error)]
pub enum ExecFault {
    /// The program reached an opcode with no defined behaviour.
    #[error("unknown opcode {} ({}) at pc {pc:#06x}", .opcode.as_u8(), .opcode.mnemonic())]
    UnknownOpcode {
        /// Offending opcode.
        opcode: Opcode,
        /// Address of the instruction.
        pc: u16,
    },
    /// A load or store could not be completed.
    #[error("bus fault at pc {pc:#06x}")]
    Bus {
        /// Address of the instruction.
        pc: u16,
        /// Underlying bus failure.
        #[source]
        source: BusError,
    },
}

impl ExecFault {
    /// Returns the reporting class for this fault.
    #[must_use]
    pub const fn class(&self) -> FaultClass {
        match self {
            Self::UnknownOpcode { .. } => FaultClass::Execution,
            Self::Bus { .. } => FaultClass::Bus,
        }
    }

    /// Program counter of the faulting instruction.
    #[must_use]
    pub const fn pc(&self) -> u16 {
        match self {
            Self::UnknownOpcode { pc, .. } | Self::Bus { pc, .. } => *pc,
        }
    }
}

/// Any failure that ends an emulation run without a program-chosen result.
#[derive(Debug, Error)]
pub enum MachineError {
    /// Loading the program or data image failed.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// Pre-loading data through the bus failed.
    #[error("data pre-load failed")]
    Preload(#[source] BusError),
    /// Execution hit a fatal fault.
    #[error(transparent)]
    Exec(#[from] ExecFault),
}

impl MachineError {
    /// Returns the reporting class for this error.
    #[must_use]
    pub const fn class(&self) -> FaultClass {
        match self {
            Self::Load(_) => FaultClass::Load,
            Self::Preload(_) => FaultClass::Bus,
            Self::Exec(fault) => fault.class(),
        }
    }
}

//! Priority-ordered device map and the standard rj32 layout.

use std::fmt;
use std::io::Write;

use crate::fault::BusError;
use crate::memory::access::{BusDevice, Transaction};
use crate::peripherals::{CharOutput, Ram};

/// Address of the character-output port.
pub const CHAR_OUT_ADDR: u16 = 0xFF00;
/// Base address of general memory.
pub const RAM_BASE: u16 = 0x0000;
/// Span of general memory on the bus (`0x0000..=0xFFFE`).
pub const RAM_SPAN: u32 = 0xFFFF;
/// Words in the full 16-bit address space.
pub const MEMORY_WORDS: usize = 0x1_0000;

/// A device bound to a contiguous address range.
pub struct Mapping {
    /// First address the device answers to.
    pub base: u16,
    /// Number of words covered, starting at `base`.
    pub span: u32,
    device: Box<dyn BusDevice>,
}

impl Mapping {
    /// True when `address` lies in `base..base + span`.
    #[must_use]
    pub fn contains(&self, address: u16) -> bool {
        address
            .checked_sub(self.base)
            .is_some_and(|offset| u32::from(offset) < self.span)
    }
}

impl fmt::Debug for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapping")
            .field("base", &self.base)
            .field("span", &self.span)
            .finish_non_exhaustive()
    }
}

/// Data bus dispatching each transaction to its devices in priority order.
///
/// The first device whose range contains the address and which accepts the
/// transaction ends the search.
#[derive(Debug, Default)]
pub struct Bus {
    mappings: Vec<Mapping>,
}

impl Bus {
    /// Creates a bus with no devices attached.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mappings: Vec::new(),
        }
    }

    /// Attaches `device` below every previously attached device.
    pub fn attach(&mut self, base: u16, span: u32, device: impl BusDevice + 'static) -> &mut Self {
        self.mappings.push(Mapping {
            base,
            span,
            device: Box::new(device),
        });
        self
    }

    /// Attached mappings, highest priority first.
    #[must_use]
    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    /// Resolves a transaction, returning whether any device accepted it.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Device`] when the accepting device fails.
    pub fn transact(&mut self, txn: &mut Transaction) -> Result<bool, BusError> {
        for mapping in &mut self.mappings {
            if !mapping.contains(txn.address) {
                continue;
            }
            let offset = txn.address.wrapping_sub(mapping.base);
            let accepted = mapping
                .device
                .transact(offset, txn)
                .map_err(|source| BusError::Device {
                    address: txn.address,
                    source,
                })?;
            if accepted {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Reads one word.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Unmapped`] when every device declines, or
    /// [`BusError::Device`] when the accepting device fails.
    pub fn read(&mut self, address: u16) -> Result<u16, BusError> {
        let mut txn = Transaction::read(address);
        if self.transact(&mut txn)? {
            Ok(txn.data)
        } else {
            Err(BusError::Unmapped {
                address,
                is_write: false,
            })
        }
    }

    /// Writes one word.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Unmapped`] when every device declines, or
    /// [`BusError::Device`] when the accepting device fails.
    pub fn write(&mut self, address: u16, value: u16) -> Result<(), BusError> {
        let mut txn = Transaction::write(address, value);
        if self.transact(&mut txn)? {
            Ok(())
        } else {
            Err(BusError::Unmapped {
                address,
                is_write: true,
            })
        }
    }
}

/// Builds the standard memory map: character output at [`CHAR_OUT_ADDR`],
/// then RAM over `0x0000..=0xFFFE`.
pub fn default_bus(output: impl Write + 'static) -> Bus {
    let mut bus = Bus::new();
    bus.attach(CHAR_OUT_ADDR, 1, CharOutput::new(output))
        .attach(RAM_BASE, RAM_SPAN, Ram::new());
    bus
}

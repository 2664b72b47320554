//! Data bus: transactions, the device contract and the priority dispatcher.

/// Bus transaction and device contract.
pub mod access;
/// Priority-ordered device map and the standard rj32 layout.
pub mod map;

pub use access::{BusDevice, Transaction};
pub use map::{default_bus, Bus, Mapping, CHAR_OUT_ADDR, MEMORY_WORDS, RAM_BASE, RAM_SPAN};

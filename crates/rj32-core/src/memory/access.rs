//! Single-word bus transactions and the device contract.

use crate::fault::DeviceError;

/// One read or write request on the 16-bit data bus.
///
/// On reads the accepting device replaces `data` with the value read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Transaction {
    /// Absolute bus address.
    pub address: u16,
    /// Value written, or the value read once a device accepts.
    pub data: u16,
    /// True for writes.
    pub is_write: bool,
}

impl Transaction {
    /// A read request; `data` starts at zero.
    #[must_use]
    pub const fn read(address: u16) -> Self {
        Self {
            address,
            data: 0,
            is_write: false,
        }
    }

    /// A write request.
    #[must_use]
    pub const fn write(address: u16, data: u16) -> Self {
        Self {
            address,
            data,
            is_write: true,
        }
    }
}

/// A device attached to the bus.
///
/// Devices may decline a transaction inside their own range, which lets a
/// lower-priority device see it instead.
pub trait BusDevice {
    /// Handles a transaction addressed `offset` words past the device base.
    ///
    /// Returns `Ok(true)` when the transaction was consumed and `Ok(false)`
    /// when the device declines it.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError`] when the device accepted the transaction but
    /// could not complete it.
    fn transact(&mut self, offset: u16, txn: &mut Transaction) -> Result<bool, DeviceError>;
}

impl<D: BusDevice + ?Sized> BusDevice for Box<D> {
    fn transact(&mut self, offset: u16, txn: &mut Transaction) -> Result<bool, DeviceError> {
        (**self).transact(offset, txn)
    }
}

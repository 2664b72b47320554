//! Concrete bus devices.

/// Character-output port.
pub mod char_out;
/// Word-addressed RAM.
pub mod ram;

pub use char_out::{CharOutput, CURSOR_RETURN};
pub use ram::Ram;

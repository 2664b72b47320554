use std::io::Write;

use crate::fault::DeviceError;
use crate::memory::access::{BusDevice, Transaction};

/// Escape sequence written in place of a carriage return.
pub const CURSOR_RETURN: &[u8] = b"\x1bD";

/// Single-word character output port.
///
/// Writes emit the low byte of the word, unbuffered. A carriage return is
/// replaced by [`CURSOR_RETURN`] so serial-terminal style output renders the
/// same way on a host terminal. Reads are declined.
#[derive(Debug)]
pub struct CharOutput<W> {
    sink: W,
}

impl<W: Write> CharOutput<W> {
    /// Wraps a host writer.
    pub const fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl<W: Write> BusDevice for CharOutput<W> {
    fn transact(&mut self, _offset: u16, txn: &mut Transaction) -> Result<bool, DeviceError> {
        if !txn.is_write {
            return Ok(false);
        }
        let [_, byte] = txn.data.to_be_bytes();
        if byte == b'\r' {
            self.sink.write_all(CURSOR_RETURN)?;
        } else {
            self.sink.write_all(&[byte])?;
        }
        self.sink.flush()?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::{CharOutput, CURSOR_RETURN};
    use crate::fault::DeviceError;
    use crate::memory::access::{BusDevice, Transaction};

    fn emit(out: &mut CharOutput<Vec<u8>>, word: u16) -> bool {
        let mut txn = Transaction::write(0xFF00, word);
        out.transact(0, &mut txn).expect("vec sink cannot fail")
    }

    #[test]
    fn writes_low_byte_only() {
        let mut out = CharOutput::new(Vec::new());
        assert!(emit(&mut out, 0x1248));
        assert!(emit(&mut out, 0x0069));
        assert_eq!(out.into_inner(), b"Hi");
    }

    #[test]
    fn carriage_return_becomes_cursor_return() {
        let mut out = CharOutput::new(Vec::new());
        emit(&mut out, u16::from(b'\r'));
        emit(&mut out, u16::from(b'\n'));
        let mut expected = CURSOR_RETURN.to_vec();
        expected.push(b'\n');
        assert_eq!(out.into_inner(), expected);
    }

    #[test]
    fn reads_are_declined() {
        let mut out = CharOutput::new(Vec::new());
        let mut txn = Transaction::read(0xFF00);
        assert!(!out.transact(0, &mut txn).expect("decline"));
        assert!(out.into_inner().is_empty());
    }

    struct Broken;

    impl io::Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn sink_failures_are_reported() {
        let mut out = CharOutput::new(Broken);
        let mut txn = Transaction::write(0xFF00, 0x41);
        assert!(matches!(
            out.transact(0, &mut txn),
            Err(DeviceError::Io(_))
        ));
    }
}

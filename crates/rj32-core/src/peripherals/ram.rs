use crate::fault::DeviceError;
use crate::memory::access::{BusDevice, Transaction};
use crate::memory::map::MEMORY_WORDS;

/// Flat word-addressed memory backing the whole 16-bit address space.
///
/// Always accepts. Reads return the stored word and writes overwrite it.
#[derive(Clone, PartialEq, Eq)]
pub struct Ram {
    words: Box<[u16]>,
}

impl Default for Ram {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Ram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ram")
            .field("words", &self.words.len())
            .finish()
    }
}

impl Ram {
    /// Zero-filled memory of [`MEMORY_WORDS`] words.
    #[must_use]
    pub fn new() -> Self {
        Self {
            words: vec![0; MEMORY_WORDS].into_boxed_slice(),
        }
    }

    /// Reads a word without going through the bus.
    #[must_use]
    pub fn peek(&self, offset: u16) -> u16 {
        self.words[usize::from(offset)]
    }

    /// Writes a word without going through the bus.
    pub fn poke(&mut self, offset: u16, value: u16) {
        self.words[usize::from(offset)] = value;
    }
}

impl BusDevice for Ram {
    fn transact(&mut self, offset: u16, txn: &mut Transaction) -> Result<bool, DeviceError> {
        if txn.is_write {
            self.poke(offset, txn.data);
        } else {
            txn.data = self.peek(offset);
        }
        Ok(true)
    }
}

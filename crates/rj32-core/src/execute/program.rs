use crate::decoder::{decode, DecodedInstruction};
use crate::fault::LoadError;
use crate::memory::MEMORY_WORDS;

/// Pre-decoded program memory, one slot per 16-bit address.
///
/// Slots past the loaded image hold `decode(0)`, a register-form `nop`.
#[derive(Clone, PartialEq, Eq)]
pub struct ProgramMemory {
    slots: Box<[DecodedInstruction]>,
}

impl ProgramMemory {
    /// Decodes `words` into a fresh program memory.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::ProgramTooLarge`] when `words` exceeds 65536 entries.
    pub fn load(words: &[u16]) -> Result<Self, LoadError> {
        if words.len() > MEMORY_WORDS {
            return Err(LoadError::ProgramTooLarge { words: words.len() });
        }
        let mut slots = vec![DecodedInstruction::default(); MEMORY_WORDS];
        for (slot, &word) in slots.iter_mut().zip(words) {
            *slot = decode(word);
        }
        Ok(Self {
            slots: slots.into_boxed_slice(),
        })
    }

    /// Instruction at `pc`.
    #[must_use]
    pub fn fetch(&self, pc: u16) -> DecodedInstruction {
        self.slots[usize::from(pc)]
    }
}

impl Default for ProgramMemory {
    fn default() -> Self {
        Self {
            slots: vec![DecodedInstruction::default(); MEMORY_WORDS].into_boxed_slice(),
        }
    }
}

impl std::fmt::Debug for ProgramMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let used = self
            .slots
            .iter()
            .rposition(|slot| *slot != DecodedInstruction::default())
            .map_or(0, |last| last + 1);
        f.debug_struct("ProgramMemory")
            .field("used_slots", &used)
            .finish()
    }
}

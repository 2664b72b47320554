use std::ops::{Index, IndexMut};

use crate::decoder::{Register, REGISTER_COUNT};

/// The sixteen general registers.
///
/// `ra` holds the return address after `call`; `a0` supplies the exit code
/// for `error`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterFile {
    values: [u16; REGISTER_COUNT],
}

impl RegisterFile {
    /// Reads a register.
    #[must_use]
    pub const fn get(&self, reg: Register) -> u16 {
        self.values[reg.index()]
    }

    /// Writes a register.
    pub const fn set(&mut self, reg: Register, value: u16) {
        self.values[reg.index()] = value;
    }

    /// All register values in index order.
    #[must_use]
    pub const fn values(&self) -> &[u16; REGISTER_COUNT] {
        &self.values
    }
}

impl Index<Register> for RegisterFile {
    type Output = u16;

    fn index(&self, reg: Register) -> &u16 {
        &self.values[reg.index()]
    }
}

impl IndexMut<Register> for RegisterFile {
    fn index_mut(&mut self, reg: Register) -> &mut u16 {
        &mut self.values[reg.index()]
    }
}

/// Staging register that widens the next instruction's immediate.
///
/// Loaded by `imm`; it survives exactly one further instruction and is
/// cleared at the end of that instruction's step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ImmediateLatch {
    /// High bits of the pending constant, already shifted left by four.
    pub value: u16,
    /// True while the latch applies to immediates.
    pub valid: bool,
    /// True during the step that loaded the latch.
    pub expire: bool,
}

impl ImmediateLatch {
    /// Latches `operand << 4` for the next instruction.
    pub const fn load(&mut self, operand: u16) {
        self.value = operand << 4;
        self.valid = true;
        self.expire = true;
    }

    /// Operand value for a canonical 13-bit immediate.
    ///
    /// With the latch valid the field supplies only the low nibble;
    /// otherwise the field is sign-extended.
    #[must_use]
    pub const fn widen(&self, imm: u16) -> u16 {
        if self.valid {
            self.value | (imm & 0xF)
        } else {
            crate::encoding::sign_extend(imm, crate::encoding::CANONICAL_IMMEDIATE_BITS)
        }
    }

    /// Address offset for a load-store 4-bit field, zero-extended when the
    /// latch is not valid.
    #[must_use]
    pub const fn offset(&self, imm: u16) -> u16 {
        if self.valid {
            self.value | (imm & 0xF)
        } else {
            imm & 0xF
        }
    }

    /// End-of-step decay: clears the latch unless it was loaded this step.
    pub const fn decay(&mut self) {
        if !self.expire {
            self.value = 0;
            self.valid = false;
        }
        self.expire = false;
    }
}

//! Instruction decoder for the rj32 ISA.
//!
//! Decoding is total: every 16-bit word maps to exactly one
//! [`DecodedInstruction`]. Opcodes that have no defined behaviour are passed
//! through unchanged and only rejected when the execution engine reaches them.

use crate::encoding::{
    sign_extend, Format, Opcode, CANONICAL_IMMEDIATE_BITS, CANONICAL_IMMEDIATE_MASK,
};

/// One of the sixteen general registers, named by its ABI role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Register {
    Ra = 0,
    A0 = 1,
    A1 = 2,
    A2 = 3,
    S0 = 4,
    S1 = 5,
    S2 = 6,
    S3 = 7,
    T0 = 8,
    T1 = 9,
    T2 = 10,
    T3 = 11,
    Gp = 12,
    Bp = 13,
    Sp = 14,
    R15 = 15,
}

/// Number of general registers.
pub const REGISTER_COUNT: usize = 16;

impl Register {
    /// Every register in index order.
    pub const ALL: [Self; REGISTER_COUNT] = [
        Self::Ra,
        Self::A0,
        Self::A1,
        Self::A2,
        Self::S0,
        Self::S1,
        Self::S2,
        Self::S3,
        Self::T0,
        Self::T1,
        Self::T2,
        Self::T3,
        Self::Gp,
        Self::Bp,
        Self::Sp,
        Self::R15,
    ];

    /// Decodes the low four bits of `bits` into a register.
    #[must_use]
    pub const fn from_u4(bits: u8) -> Self {
        Self::ALL[(bits & 0xF) as usize]
    }

    /// Register file index (`0..=15`).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Raw 4-bit field value.
    #[must_use]
    pub const fn as_u4(self) -> u16 {
        self as u16
    }

    /// ABI name used in listings and traces.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ra => "ra",
            Self::A0 => "a0",
            Self::A1 => "a1",
            Self::A2 => "a2",
            Self::S0 => "s0",
            Self::S1 => "s1",
            Self::S2 => "s2",
            Self::S3 => "s3",
            Self::T0 => "t0",
            Self::T1 => "t1",
            Self::T2 => "t2",
            Self::T3 => "t3",
            Self::Gp => "gp",
            Self::Bp => "bp",
            Self::Sp => "sp",
            Self::R15 => "r15",
        }
    }
}

/// Canonical decoded instruction.
///
/// `imm` is always the 13-bit canonical immediate: sign-extended field
/// truncated to 13 bits for the immediate formats, the raw unsigned 4-bit
/// offset for load-store, and zero for register-register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DecodedInstruction {
    /// Bit layout the word was decoded with.
    pub format: Format,
    /// Opcode in the flat 5-bit space.
    pub opcode: Opcode,
    /// Destination register (also the stored value for `store`).
    pub rd: Register,
    /// Source or base register.
    pub rs: Register,
    /// Canonical 13-bit immediate.
    pub imm: u16,
}

impl Default for DecodedInstruction {
    fn default() -> Self {
        decode(0)
    }
}

const fn field(word: u16, shift: u32, bits: u32) -> u16 {
    (word >> shift) & ((1 << bits) - 1)
}

const fn canonical(value: u16, bits: u32) -> u16 {
    sign_extend(value, bits) & CANONICAL_IMMEDIATE_MASK
}

/// Decodes a raw 16-bit word.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn decode(word: u16) -> DecodedInstruction {
    let format = Format::of_word(word);
    let rd = Register::from_u4(field(word, 12, 4) as u8);
    match format {
        Format::Rr => DecodedInstruction {
            format,
            opcode: Opcode::from_u5(field(word, 2, 5) as u8),
            rd,
            rs: Register::from_u4(field(word, 8, 4) as u8),
            imm: 0,
        },
        Format::Ls => DecodedInstruction {
            format,
            opcode: Opcode::from_u5(field(word, 2, 2) as u8 | format.opcode_base()),
            rd,
            rs: Register::from_u4(field(word, 8, 4) as u8),
            imm: field(word, 4, 4),
        },
        Format::Ri6 => DecodedInstruction {
            format,
            opcode: Opcode::from_u5(field(word, 2, 4) as u8 | format.opcode_base()),
            rd,
            rs: Register::Ra,
            imm: canonical(field(word, 6, 6), 6),
        },
        Format::Ri8 => DecodedInstruction {
            format,
            opcode: Opcode::from_u5(field(word, 3, 1) as u8 | format.opcode_base()),
            rd,
            rs: Register::Ra,
            imm: canonical(field(word, 4, 8), 8),
        },
        Format::I11 => DecodedInstruction {
            format,
            opcode: Opcode::from_u5(field(word, 3, 2) as u8 | format.opcode_base()),
            rd: Register::Ra,
            rs: Register::Ra,
            imm: canonical(field(word, 5, 11), 11),
        },
        Format::I12 => DecodedInstruction {
            format,
            opcode: Opcode::Imm,
            rd: Register::Ra,
            rs: Register::Ra,
            imm: canonical(field(word, 4, 12), 12),
        },
    }
}

impl DecodedInstruction {
    /// The canonical immediate sign-extended to a full word.
    #[must_use]
    pub const fn immediate(self) -> u16 {
        sign_extend(self.imm, CANONICAL_IMMEDIATE_BITS)
    }

    /// Re-packs the instruction into a raw word.
    ///
    /// Opcode bits outside the format's sub-field and immediate bits above
    /// the format's field width are dropped, so `decode(i.encode()) == i`
    /// holds for every instruction produced by [`decode`].
    #[must_use]
    pub const fn encode(self) -> u16 {
        let op = self.opcode.as_u8() as u16;
        let rd = self.rd.as_u4() << 12;
        let rs = self.rs.as_u4() << 8;
        match self.format {
            Format::Rr => rd | rs | ((op & 0x1F) << 2) | Format::Rr.discriminator(),
            Format::Ls => {
                rd | rs | ((self.imm & 0xF) << 4) | ((op & 0b11) << 2) | Format::Ls.discriminator()
            }
            Format::Ri6 => {
                rd | ((self.imm & 0x3F) << 6) | ((op & 0xF) << 2) | Format::Ri6.discriminator()
            }
            Format::Ri8 => {
                rd | ((self.imm & 0xFF) << 4) | ((op & 0b1) << 3) | Format::Ri8.discriminator()
            }
            Format::I11 => ((self.imm & 0x7FF) << 5) | ((op & 0b10) << 3) | Format::I11.discriminator(),
            Format::I12 => ((self.imm & 0xFFF) << 4) | Format::I12.discriminator(),
        }
    }
}

/// Packs a register-register instruction.
#[must_use]
pub const fn encode_rr(opcode: Opcode, rd: Register, rs: Register) -> u16 {
    DecodedInstruction {
        format: Format::Rr,
        opcode,
        rd,
        rs,
        imm: 0,
    }
    .encode()
}

/// Packs a load-store instruction with a 4-bit unsigned offset.
#[must_use]
pub const fn encode_ls(opcode: Opcode, rd: Register, rs: Register, offset: u16) -> u16 {
    DecodedInstruction {
        format: Format::Ls,
        opcode,
        rd,
        rs,
        imm: offset,
    }
    .encode()
}

/// Packs a short register-immediate instruction (`imm` in `-32..=31`).
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub const fn encode_ri6(opcode: Opcode, rd: Register, imm: i16) -> u16 {
    DecodedInstruction {
        format: Format::Ri6,
        opcode,
        rd,
        rs: Register::Ra,
        imm: imm as u16,
    }
    .encode()
}

/// Packs a byte register-immediate instruction (`imm` in `-128..=127`).
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub const fn encode_ri8(opcode: Opcode, rd: Register, imm: i16) -> u16 {
    DecodedInstruction {
        format: Format::Ri8,
        opcode,
        rd,
        rs: Register::Ra,
        imm: imm as u16,
    }
    .encode()
}

/// Packs a `jump`/`call` with an 11-bit signed offset.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub const fn encode_i11(opcode: Opcode, imm: i16) -> u16 {
    DecodedInstruction {
        format: Format::I11,
        opcode,
        rd: Register::Ra,
        rs: Register::Ra,
        imm: imm as u16,
    }
    .encode()
}

/// Packs an `imm` latch load with a 12-bit signed value.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub const fn encode_i12(imm: i16) -> u16 {
    DecodedInstruction {
        format: Format::I12,
        opcode: Opcode::Imm,
        rd: Register::Ra,
        rs: Register::Ra,
        imm: imm as u16,
    }
    .encode()
}

/// Instruction formats, identified by a discriminator in the low bits of the word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Format {
    /// Register-register: `rd:4 rs:4 _:1 op:5 fmt:2`.
    Rr,
    /// Load-store: `rd:4 rs:4 imm:4 op:2 fmt:2`.
    Ls,
    /// Short register-immediate: `rd:4 imm:6 op:4 fmt:2`.
    Ri6,
    /// Byte register-immediate: `rd:4 imm:8 op:1 fmt:3`.
    Ri8,
    /// Absolute-immediate control transfer: `imm:11 op:2 fmt:3`.
    I11,
    /// General immediate (latch load): `imm:12 fmt:4`.
    I12,
}

impl Format {
    /// Every format, in discriminator-width order.
    pub const ALL: [Self; 6] = [
        Self::Rr,
        Self::Ls,
        Self::Ri6,
        Self::Ri8,
        Self::I11,
        Self::I12,
    ];

    /// Discriminator value stored in the low bits of the word.
    #[must_use]
    pub const fn discriminator(self) -> u16 {
        match self {
            Self::Rr => 0b00,
            Self::Ls => 0b10,
            Self::Ri6 => 0b11,
            Self::Ri8 => 0b001,
            Self::I11 => 0b0101,
            Self::I12 => 0b1101,
        }
    }

    /// Number of low-order bits the discriminator occupies.
    #[must_use]
    pub const fn discriminator_bits(self) -> u32 {
        match self {
            Self::Rr | Self::Ls | Self::Ri6 => 2,
            Self::Ri8 => 3,
            Self::I11 | Self::I12 => 4,
        }
    }

    /// Classifies a raw word. Total: every word belongs to exactly one format.
    #[must_use]
    pub const fn of_word(word: u16) -> Self {
        match word & 0b11 {
            0b00 => Self::Rr,
            0b10 => Self::Ls,
            0b11 => Self::Ri6,
            _ => {
                if word & 0b111 == 0b001 {
                    Self::Ri8
                } else if word & 0b1111 == 0b0101 {
                    Self::I11
                } else {
                    Self::I12
                }
            }
        }
    }

    /// Short listing name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rr => "RR",
            Self::Ls => "LS",
            Self::Ri6 => "RI6",
            Self::Ri8 => "RI8",
            Self::I11 => "I11",
            Self::I12 => "I12",
        }
    }

    /// Opcode base OR-ed with the format's opcode sub-field.
    ///
    /// `Rr` carries the full 5-bit opcode and `I12` has no sub-field, so both
    /// report a zero base.
    #[must_use]
    pub const fn opcode_base(self) -> u8 {
        match self {
            Self::Rr | Self::I12 => 0,
            Self::Ls => 0b01100,
            Self::Ri6 => 0b10000,
            Self::Ri8 => 0b00110,
            Self::I11 => 0b01000,
        }
    }

    /// Width of the format's immediate field, zero when it has none.
    #[must_use]
    pub const fn immediate_bits(self) -> u32 {
        match self {
            Self::Rr => 0,
            Self::Ls => 4,
            Self::Ri6 => 6,
            Self::Ri8 => 8,
            Self::I11 => 11,
            Self::I12 => 12,
        }
    }
}

/// The flat 5-bit opcode space shared by all formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Opcode {
    Nop = 0,
    Rets = 1,
    Error = 2,
    Halt = 3,
    Rcsr = 4,
    Wcsr = 5,
    Move = 6,
    Loadc = 7,
    Jump = 8,
    Imm = 9,
    Call = 10,
    Imm2 = 11,
    Load = 12,
    Store = 13,
    Loadb = 14,
    Storeb = 15,
    Add = 16,
    Sub = 17,
    Addc = 18,
    Subc = 19,
    Xor = 20,
    And = 21,
    Or = 22,
    Shl = 23,
    Shr = 24,
    Asr = 25,
    IfEq = 26,
    IfNe = 27,
    IfLt = 28,
    IfGe = 29,
    IfUlt = 30,
    IfUge = 31,
}

/// Every opcode keyed by its 5-bit value.
pub const OPCODE_TABLE: [(u8, Opcode); 32] = [
    (0, Opcode::Nop),
    (1, Opcode::Rets),
    (2, Opcode::Error),
    (3, Opcode::Halt),
    (4, Opcode::Rcsr),
    (5, Opcode::Wcsr),
    (6, Opcode::Move),
    (7, Opcode::Loadc),
    (8, Opcode::Jump),
    (9, Opcode::Imm),
    (10, Opcode::Call),
    (11, Opcode::Imm2),
    (12, Opcode::Load),
    (13, Opcode::Store),
    (14, Opcode::Loadb),
    (15, Opcode::Storeb),
    (16, Opcode::Add),
    (17, Opcode::Sub),
    (18, Opcode::Addc),
    (19, Opcode::Subc),
    (20, Opcode::Xor),
    (21, Opcode::And),
    (22, Opcode::Or),
    (23, Opcode::Shl),
    (24, Opcode::Shr),
    (25, Opcode::Asr),
    (26, Opcode::IfEq),
    (27, Opcode::IfNe),
    (28, Opcode::IfLt),
    (29, Opcode::IfGe),
    (30, Opcode::IfUlt),
    (31, Opcode::IfUge),
];

impl Opcode {
    /// Converts the low five bits of `value` into an opcode.
    #[must_use]
    pub const fn from_u5(value: u8) -> Self {
        OPCODE_TABLE[(value & 0x1F) as usize].1
    }

    /// Returns the 5-bit opcode value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Assembly mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Nop => "nop",
            Self::Rets => "rets",
            Self::Error => "error",
            Self::Halt => "halt",
            Self::Rcsr => "rcsr",
            Self::Wcsr => "wcsr",
            Self::Move => "move",
            Self::Loadc => "loadc",
            Self::Jump => "jump",
            Self::Imm => "imm",
            Self::Call => "call",
            Self::Imm2 => "imm2",
            Self::Load => "load",
            Self::Store => "store",
            Self::Loadb => "loadb",
            Self::Storeb => "storeb",
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Addc => "addc",
            Self::Subc => "subc",
            Self::Xor => "xor",
            Self::And => "and",
            Self::Or => "or",
            Self::Shl => "shl",
            Self::Shr => "shr",
            Self::Asr => "asr",
            Self::IfEq => "if.eq",
            Self::IfNe => "if.ne",
            Self::IfLt => "if.lt",
            Self::IfGe => "if.ge",
            Self::IfUlt => "if.ult",
            Self::IfUge => "if.uge",
        }
    }

    /// True for the six compare-and-skip opcodes.
    #[must_use]
    pub const fn is_conditional(self) -> bool {
        (self as u8) >= Self::IfEq as u8
    }

    /// True for `imm`, the prefix a skip steps over together with the
    /// instruction it widens. `imm2` also loads the latch but is skipped alone.
    #[must_use]
    pub const fn is_immediate_prefix(self) -> bool {
        matches!(self, Self::Imm)
    }
}

/// Sign-extends the low `bits` bits of `field` to a full word.
///
/// Uses the xor-then-subtract form: `(field ^ m) - m` with `m` the sign bit.
/// `bits` must be in `1..=16`.
#[must_use]
pub const fn sign_extend(field: u16, bits: u32) -> u16 {
    let mask = if bits >= 16 {
        u16::MAX
    } else {
        (1u16 << bits) - 1
    };
    let sign = 1u16 << (bits - 1);
    ((field & mask) ^ sign).wrapping_sub(sign)
}

/// Width of the canonical immediate carried by a decoded instruction.
pub const CANONICAL_IMMEDIATE_BITS: u32 = 13;

/// Mask selecting the canonical 13-bit immediate.
pub const CANONICAL_IMMEDIATE_MASK: u16 = 0x1FFF;

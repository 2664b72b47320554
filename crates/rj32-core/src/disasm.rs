//! Instruction listing for the rj32 ISA.
//!
//! Renders decoded instructions in the assembler's own syntax, e.g.
//! `add   a0, a1`, `load  a0, [sp, 2]` or `jump  -6`.

use std::fmt;

use crate::decoder::{decode, DecodedInstruction};
use crate::encoding::{Format, Opcode};

impl fmt::Display for DecodedInstruction {
    #[allow(clippy::cast_possible_wrap)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mnemonic = self.opcode.mnemonic();
        let rd = self.rd.name();
        let rs = self.rs.name();
        let imm = self.immediate() as i16;
        match self.format {
            Format::Rr => write!(f, "{mnemonic:<5} {rd}, {rs}"),
            Format::I11 | Format::I12 => write!(f, "{mnemonic:<5} {imm}"),
            Format::Ri6 | Format::Ri8 => write!(f, "{mnemonic:<5} {rd}, {imm}"),
            Format::Ls => {
                if matches!(self.opcode, Opcode::Load | Opcode::Loadb) {
                    write!(f, "{mnemonic:<5} {rd}, [{rs}, {}]", self.imm)
                } else {
                    write!(f, "{mnemonic:<5} [{rs}, {}], {rd}", self.imm)
                }
            }
        }
    }
}

/// A single listing row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DisassemblyRow {
    /// Word address of the instruction.
    pub addr: u16,
    /// Raw instruction word.
    pub raw_word: u16,
    /// Rendered instruction text.
    pub text: String,
}

/// Disassembles `words` as a program image loaded at address zero.
#[must_use]
pub fn disassemble(words: &[u16]) -> Vec<DisassemblyRow> {
    (0..=u16::MAX)
        .zip(words)
        .map(|(addr, &raw_word)| DisassemblyRow {
            addr,
            raw_word,
            text: decode(raw_word).to_string(),
        })
        .collect()
}

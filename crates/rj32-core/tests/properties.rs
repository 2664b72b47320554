//! Property coverage for decoding, sign extension and the ALU path.

#![allow(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap
)]

use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

use std::io;

use proptest::prelude::*;
use rj32_core::{
    decode, default_bus, encode_i11, encode_i12, encode_ls, encode_ri6, encode_ri8, encode_rr,
    sign_extend, Format, Machine, Opcode, Register, RunOutcome, CANONICAL_IMMEDIATE_MASK,
};

const HALT: u16 = 0x000C;

fn register() -> impl Strategy<Value = Register> {
    (0u8..16).prop_map(Register::from_u4)
}

fn opcode() -> impl Strategy<Value = Opcode> {
    (0u8..32).prop_map(Opcode::from_u5)
}

fn as_signed(value: u16) -> i16 {
    i16::from_ne_bytes(value.to_ne_bytes())
}

proptest! {
    #[test]
    fn every_word_decodes_to_a_canonical_instruction(word in any::<u16>()) {
        let instr = decode(word);
        prop_assert_eq!(instr.format, Format::of_word(word));
        prop_assert_eq!(instr.imm & !CANONICAL_IMMEDIATE_MASK, 0);
        prop_assert_eq!(decode(instr.encode()), instr);
        if instr.format == Format::I11 {
            prop_assert!(matches!(instr.opcode, Opcode::Jump | Opcode::Call));
        }
    }

    #[test]
    fn register_form_round_trips(op in opcode(), rd in register(), rs in register()) {
        let instr = decode(encode_rr(op, rd, rs));
        prop_assert_eq!(instr.format, Format::Rr);
        prop_assert_eq!((instr.opcode, instr.rd, instr.rs, instr.imm), (op, rd, rs, 0));
    }

    #[test]
    fn load_store_offsets_stay_unsigned(
        store in any::<bool>(),
        rd in register(),
        rs in register(),
        offset in 0u16..16,
    ) {
        let op = if store { Opcode::Store } else { Opcode::Load };
        let instr = decode(encode_ls(op, rd, rs, offset));
        prop_assert_eq!((instr.opcode, instr.rd, instr.rs, instr.imm), (op, rd, rs, offset));
    }

    #[test]
    fn short_immediates_sign_extend(index in 0u8..16, rd in register(), imm in -32i16..32) {
        let op = Opcode::from_u5(0b10000 | index);
        let instr = decode(encode_ri6(op, rd, imm));
        prop_assert_eq!((instr.format, instr.opcode, instr.rd), (Format::Ri6, op, rd));
        prop_assert_eq!(as_signed(instr.immediate()), imm);
    }

    #[test]
    fn byte_immediates_sign_extend(loadc in any::<bool>(), rd in register(), imm in -128i16..128) {
        let op = if loadc { Opcode::Loadc } else { Opcode::Move };
        let instr = decode(encode_ri8(op, rd, imm));
        prop_assert_eq!((instr.format, instr.opcode, instr.rd), (Format::Ri8, op, rd));
        prop_assert_eq!(as_signed(instr.immediate()), imm);
    }

    #[test]
    fn control_offsets_sign_extend(call in any::<bool>(), imm in -1024i16..1024) {
        let op = if call { Opcode::Call } else { Opcode::Jump };
        let instr = decode(encode_i11(op, imm));
        prop_assert_eq!((instr.format, instr.opcode), (Format::I11, op));
        prop_assert_eq!(as_signed(instr.immediate()), imm);
    }

    #[test]
    fn latch_loads_sign_extend(imm in -2048i16..2048) {
        let instr = decode(encode_i12(imm));
        prop_assert_eq!((instr.format, instr.opcode), (Format::I12, Opcode::Imm));
        prop_assert_eq!(as_signed(instr.immediate()), imm);
    }

    #[test]
    fn sign_extension_matches_twos_complement(bits in 1u32..16, raw in any::<i16>()) {
        let half = 1i32 << (bits - 1);
        let value = i32::from(raw).rem_euclid(2 * half) - half;
        let field = (value as u16) & ((1u16 << bits) - 1);
        prop_assert_eq!(as_signed(sign_extend(field, bits)), value as i16);
    }

    #[test]
    fn imm_prefix_builds_any_constant(value in any::<u16>()) {
        let high = as_signed(sign_extend(value >> 4, 12));
        let low = (value & 0xF) as i16;
        let mut machine = Machine::new(default_bus(io::sink()));
        machine
            .load_program(&[encode_i12(high), encode_ri8(Opcode::Move, Register::S0, low), HALT])
            .unwrap();
        prop_assert_eq!(machine.run(10).unwrap(), RunOutcome::Halted);
        prop_assert_eq!(machine.state().regs[Register::S0], value);
    }

    #[test]
    fn add_through_memory_wraps(a in any::<u16>(), b in any::<u16>()) {
        let mut machine = Machine::new(default_bus(io::sink()));
        machine
            .load_program(&[
                encode_ls(Opcode::Load, Register::A0, Register::Ra, 0),
                encode_ls(Opcode::Load, Register::A1, Register::Ra, 1),
                encode_rr(Opcode::Add, Register::A0, Register::A1),
                encode_ls(Opcode::Store, Register::A0, Register::Ra, 2),
                HALT,
            ])
            .unwrap();
        machine.load_data(&[a, b]).unwrap();
        prop_assert_eq!(machine.run(10).unwrap(), RunOutcome::Halted);
        prop_assert_eq!(machine.bus_mut().read(2).unwrap(), a.wrapping_add(b));
    }
}

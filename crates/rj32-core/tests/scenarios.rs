//! End-to-end scenarios through the public machine API.

use proptest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use rstest::rstest;

use rj32_core::{
    default_bus, emulate, encode_i11, encode_i12, encode_ls, encode_ri6, encode_ri8, encode_rr,
    Bus, BusDevice, DeviceError, ExecFault, FaultClass, Machine, MachineConfig, MachineError,
    Opcode, Ram, Register, RunOutcome, RunState, StepOutcome, Transaction, WriterTrace,
    CHAR_OUT_ADDR,
};

const HALT: u16 = 0x000C;
const ERROR: u16 = 0x0008;

#[derive(Clone, Default)]
struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl SharedBuf {
    fn contents(&self) -> Vec<u8> {
        self.0.borrow().clone()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Loads the character-output port address into `a1`.
fn port_in_a1() -> [u16; 2] {
    [encode_i12(-16), encode_ri8(Opcode::Move, Register::A1, 0)]
}

fn put_char(byte: i16) -> [u16; 2] {
    [
        encode_ri8(Opcode::Move, Register::A0, byte),
        encode_ls(Opcode::Store, Register::A0, Register::A1, 0),
    ]
}

#[test]
fn arithmetic_result_becomes_the_exit_code() {
    let program = [
        encode_ri8(Opcode::Move, Register::A0, 5),
        encode_ri6(Opcode::Add, Register::A0, 20),
        encode_ri6(Opcode::Sub, Register::A0, 4),
        ERROR,
    ];
    assert_eq!(program, [0x1051, 0x1503, 0x1107, 0x0008]);
    let outcome = emulate(&MachineConfig::default(), &program, &[], io::sink()).unwrap();
    assert_eq!(outcome, RunOutcome::Errored { code: 21 });
    assert_eq!(outcome.exit_code(), 21);
}

#[test]
fn characters_reach_the_output_sink() {
    let mut program = Vec::new();
    program.extend(port_in_a1());
    program.extend(put_char(i16::from(b'H')));
    program.extend(put_char(i16::from(b'i')));
    program.extend(put_char(i16::from(b'\r')));
    program.push(HALT);

    let out = SharedBuf::default();
    let outcome = emulate(&MachineConfig::default(), &program, &[], out.clone()).unwrap();
    assert_eq!(outcome, RunOutcome::Halted);
    assert_eq!(out.contents(), b"Hi\x1bD");
}

#[test]
fn port_writes_never_reach_ram() {
    let mut program = Vec::new();
    program.extend(port_in_a1());
    program.push(encode_ls(Opcode::Load, Register::A0, Register::A1, 0));
    program.push(ERROR);

    let mut data = vec![0; usize::from(CHAR_OUT_ADDR) + 1];
    data[usize::from(CHAR_OUT_ADDR)] = u16::from(b'M');
    let out = SharedBuf::default();
    let outcome = emulate(&MachineConfig::default(), &program, &data, out.clone()).unwrap();
    // the pre-load printed the byte; the load falls through to untouched RAM
    assert_eq!(out.contents(), b"M");
    assert_eq!(outcome, RunOutcome::Errored { code: 1 });
}

#[test]
fn skipped_imm_prefix_is_skipped_with_its_instruction() {
    let program = [
        encode_ri8(Opcode::Move, Register::A0, 1),
        encode_ri6(Opcode::IfEq, Register::A0, 2),
        encode_i12(0x100),
        encode_ri8(Opcode::Move, Register::A0, 9),
        ERROR,
    ];
    let outcome = emulate(&MachineConfig::default(), &program, &[], io::sink()).unwrap();
    assert_eq!(outcome, RunOutcome::Errored { code: 1 });
}

#[rstest]
#[case::failed_plain(false, 2, 0)]
#[case::failed_widened(true, 2, 0)]
#[case::taken_plain(false, 7, 7)]
#[case::taken_widened(true, 7, 7)]
fn skipped_store_leaves_memory_untouched(
    #[case] widened: bool,
    #[case] compare: i16,
    #[case] expected: u16,
) {
    let mut program = vec![
        encode_ri8(Opcode::Move, Register::A0, 7),
        encode_ri6(Opcode::IfEq, Register::A0, compare),
    ];
    if widened {
        program.push(encode_i12(0x10));
    }
    program.push(encode_ls(Opcode::Store, Register::A0, Register::Sp, 0));
    program.push(HALT);
    let target = if widened { 0x0100 } else { 0x0000 };

    let mut machine = Machine::new(default_bus(io::sink()));
    machine.load_program(&program).unwrap();
    assert_eq!(machine.run(100).unwrap(), RunOutcome::Halted);

    let bus = machine.bus_mut();
    assert_eq!(bus.read(target).unwrap(), expected);
    if widened {
        assert_eq!(bus.read(0x0000).unwrap(), 0);
    }
}

#[test]
fn skip_steps_over_imm2_alone() {
    let program = [
        encode_ri8(Opcode::Move, Register::A0, 1),
        encode_ri6(Opcode::IfEq, Register::A0, 2),
        encode_rr(Opcode::Imm2, Register::A0, Register::A0),
        encode_ri8(Opcode::Move, Register::A0, 9),
        ERROR,
    ];
    let outcome = emulate(&MachineConfig::default(), &program, &[], io::sink()).unwrap();
    assert_eq!(outcome, RunOutcome::Errored { code: 9 });
}

#[test]
fn taken_condition_keeps_the_widened_instruction() {
    let program = [
        encode_ri8(Opcode::Move, Register::A0, 2),
        encode_ri6(Opcode::IfEq, Register::A0, 2),
        encode_i12(0x10),
        encode_ri8(Opcode::Move, Register::A0, 3),
        ERROR,
    ];
    let outcome = emulate(&MachineConfig::default(), &program, &[], io::sink()).unwrap();
    assert_eq!(outcome, RunOutcome::Errored { code: 0x103 });
}

#[test]
fn endless_loop_hits_the_cycle_limit() {
    let config = MachineConfig {
        max_cycles: 1_000,
        trace: false,
    };
    let program = [encode_i11(Opcode::Jump, -1)];
    let outcome = emulate(&config, &program, &[], io::sink()).unwrap();
    assert_eq!(outcome, RunOutcome::CycleLimitReached);
    assert_eq!(outcome.exit_code(), 1);
}

#[test]
fn unimplemented_opcode_is_a_fatal_fault() {
    let program = [0, encode_rr(Opcode::Storeb, Register::A0, Register::A1)];
    let err = emulate(&MachineConfig::default(), &program, &[], io::sink()).unwrap_err();
    assert_eq!(err.class(), FaultClass::Execution);
    assert!(matches!(
        err,
        MachineError::Exec(ExecFault::UnknownOpcode {
            opcode: Opcode::Storeb,
            pc: 1
        })
    ));
}

#[test]
fn highest_address_is_unmapped() {
    // move a1, -1; load a0, [a1, 0]
    let program = [
        encode_ri8(Opcode::Move, Register::A1, -1),
        encode_ls(Opcode::Load, Register::A0, Register::A1, 0),
        HALT,
    ];
    let err = emulate(&MachineConfig::default(), &program, &[], io::sink()).unwrap_err();
    assert_eq!(err.class(), FaultClass::Bus);
    assert_eq!(
        std::error::Error::source(&err).map(ToString::to_string).as_deref(),
        Some("no device accepted read at 0xffff")
    );
}

#[test]
fn stepping_matches_running() {
    let program = [
        encode_ri8(Opcode::Move, Register::A0, 3),
        encode_ri6(Opcode::Sub, Register::A0, 1),
        encode_ri6(Opcode::IfNe, Register::A0, 0),
        encode_i11(Opcode::Jump, -3),
        HALT,
    ];

    let mut stepped = Machine::new(default_bus(io::sink()));
    stepped.load_program(&program).unwrap();
    let mut steps = 0;
    while stepped.step().unwrap() == StepOutcome::Retired {
        steps += 1;
    }

    let mut ran = Machine::new(default_bus(io::sink()));
    ran.load_program(&program).unwrap();
    assert_eq!(ran.run(3).unwrap(), RunOutcome::CycleLimitReached);
    assert_eq!(ran.state().run_state, RunState::CycleLimitReached);
    assert_eq!(ran.run(100).unwrap(), RunOutcome::Halted);

    assert_eq!(stepped.state(), ran.state());
    assert_eq!(stepped.state().cycles, steps);
    assert_eq!(steps, 9);
}

struct Overlay {
    value: u16,
}

impl BusDevice for Overlay {
    fn transact(&mut self, _offset: u16, txn: &mut Transaction) -> Result<bool, DeviceError> {
        if txn.is_write {
            return Ok(false);
        }
        txn.data = self.value;
        Ok(true)
    }
}

#[test]
fn earlier_mappings_win() {
    let mut bus = Bus::new();
    bus.attach(0x0010, 1, Overlay { value: 0xBEEF });
    bus.attach(0x0000, 0x1_0000, Ram::new());

    let mut machine = Machine::new(bus);
    machine
        .load_program(&[
            encode_ls(Opcode::Load, Register::A0, Register::Ra, 0),
            encode_ri8(Opcode::Move, Register::A1, 0x10),
            encode_ls(Opcode::Load, Register::A1, Register::A1, 0),
            HALT,
        ])
        .unwrap();
    machine.load_data(&[0x1234]).unwrap();
    assert_eq!(machine.run(10).unwrap(), RunOutcome::Halted);
    assert_eq!(machine.state().regs[Register::A0], 0x1234);
    assert_eq!(machine.state().regs[Register::A1], 0xBEEF);

    // writes fall through the overlay
    machine.bus_mut().write(0x0010, 5).unwrap();
    assert_eq!(machine.bus_mut().read(0x0010).unwrap(), 0xBEEF);
}

#[test]
fn writer_trace_renders_each_step() {
    let out = SharedBuf::default();
    let mut machine =
        Machine::new(default_bus(io::sink())).with_trace(WriterTrace::new(out.clone()));
    machine
        .load_program(&[
            encode_ri8(Opcode::Move, Register::A0, 5),
            encode_ri6(Opcode::IfEq, Register::A0, 5),
            HALT,
        ])
        .unwrap();
    assert_eq!(machine.run(10).unwrap(), RunOutcome::Halted);

    let text = String::from_utf8(out.contents()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        [
            "0000: move  a0, 5    (a0:0 rsval:5)",
            "  a0 <- 5",
            "0001: if.eq a0, 5    (a0:5 rsval:5)",
            "  skip <- false",
            "0002: halt  ra, ra   (ra:0 ra:0)",
        ]
    );
}

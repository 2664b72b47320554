#![no_main]

use std::io;

use libfuzzer_sys::fuzz_target;
use rj32_core::{decode, default_bus, run, CpuState, NoopTrace, ProgramMemory};

fuzz_target!(|data: &[u8]| {
    let words: Vec<u16> = data
        .chunks(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair.get(1).copied().unwrap_or(0)]))
        .collect();

    for &word in &words {
        let instr = decode(word);
        assert_eq!(decode(instr.encode()), instr);
        let _ = instr.to_string();
    }

    let Ok(program) = ProgramMemory::load(&words) else {
        return;
    };
    let mut state = CpuState::default();
    let mut bus = default_bus(io::sink());
    let _ = run(&mut state, &program, &mut bus, &mut NoopTrace, 4_096);
});

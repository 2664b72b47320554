//! CLI entry point for the rj32 emulator.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::PathBuf;

use rj32_core::{
    disassemble, emulate, MachineConfig, RunOutcome, DEFAULT_MAX_CYCLES, MEMORY_WORDS,
};
#[cfg(test)]
use tempfile as _;

const USAGE_TEXT: &str = "\
Usage: rj32-emu <image> [options]

Runs a little-endian image of 16-bit words. The first 65536 words are the
program; any words after that are data pre-loaded at address 0.

Options:
  --max-cycles <n>  Instruction budget (default: 1000000)
  --trace           Print an execution trace to stderr
  --disasm          List the program instead of running it
  -h, --help        Show this help message

Exit status is the low byte of the program's exit code (1 when that byte
is 0 after an error), or 1 on faults and timeouts.
";

#[derive(Debug, PartialEq, Eq)]
struct RunArgs {
    image: PathBuf,
    max_cycles: u64,
    trace: bool,
    disasm: bool,
}

#[derive(Debug)]
enum ParseResult {
    Run(RunArgs),
    Help,
}

#[allow(clippy::while_let_on_iterator)]
fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let mut image: Option<PathBuf> = None;
    let mut max_cycles = DEFAULT_MAX_CYCLES;
    let mut trace = false;
    let mut disasm = false;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Ok(ParseResult::Help);
        }

        if arg == "--trace" {
            trace = true;
            continue;
        }

        if arg == "--disasm" {
            disasm = true;
            continue;
        }

        if arg == "--max-cycles" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --max-cycles".to_string())?;
            let text = value.to_string_lossy();
            max_cycles = text
                .parse()
                .map_err(|_| format!("invalid cycle count: {text}"))?;
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if image.is_some() {
            return Err("multiple image paths provided".to_string());
        }
        image = Some(PathBuf::from(arg));
    }

    let image = image.ok_or_else(|| "missing image path".to_string())?;
    Ok(ParseResult::Run(RunArgs {
        image,
        max_cycles,
        trace,
        disasm,
    }))
}

/// Little-endian words; an odd trailing byte becomes the low half of a final word.
fn words_from_bytes(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair.get(1).copied().unwrap_or(0)]))
        .collect()
}

/// Splits an image into its program and data parts.
fn split_image(words: &[u16]) -> (&[u16], &[u16]) {
    words.split_at(words.len().min(MEMORY_WORDS))
}

fn print_listing(program: &[u16]) {
    for row in disassemble(program) {
        println!("{:04x}: {:04x}  {}", row.addr, row.raw_word, row.text);
    }
}

/// Process status for `outcome`. Unix keeps only the low byte, so error codes
/// that are multiples of 256 still exit nonzero.
fn process_status(outcome: RunOutcome) -> i32 {
    match outcome {
        RunOutcome::Errored { code } => match code & 0xFF {
            0 => 1,
            low => i32::from(low),
        },
        other => other.exit_code(),
    }
}

fn run_image(args: &RunArgs) -> i32 {
    let bytes = match fs::read(&args.image) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("error: failed to read {}: {e}", args.image.display());
            return 1;
        }
    };
    let words = words_from_bytes(&bytes);
    let (program, data) = split_image(&words);

    if args.disasm {
        print_listing(program);
        return 0;
    }

    let config = MachineConfig {
        max_cycles: args.max_cycles,
        trace: args.trace,
    };
    match emulate(&config, program, data, io::stdout()) {
        Ok(outcome) => {
            if outcome == RunOutcome::CycleLimitReached {
                eprintln!("Program failed to terminate");
            }
            process_status(outcome)
        }
        Err(e) => {
            eprint!("error: {e}");
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprint!(": {cause}");
                source = cause.source();
            }
            eprintln!();
            1
        }
    }
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Run(args)) => run_image(&args),
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!("{USAGE_TEXT}");
            1
        }
    };

    std::process::exit(exit_code);
}

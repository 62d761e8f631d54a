//! CLI entry point for the 8080 disassembler binary.

use std::env;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;

use i8080_core as _;
use i8080_disasm::{disassemble_file, parse_origin, render_listing};
#[cfg(test)]
use tempfile as _;
use thiserror as _;

const USAGE_TEXT: &str = "\
Usage: i8080-disasm <file> [--origin <hex>]

Arguments:
  <file>               Raw 8080 binary image

Options:
  -o, --origin <hex>   Load address of the first byte (default: 0000)
  -h, --help           Show this help message

Examples:
  i8080-disasm program.bin
  i8080-disasm program.bin --origin 0x0100
";

#[derive(Debug, PartialEq, Eq)]
struct DisasmArgs {
    input: PathBuf,
    origin: u16,
}

#[derive(Debug, PartialEq, Eq)]
enum ParseResult {
    Command(DisasmArgs),
    Help,
}

#[allow(clippy::while_let_on_iterator)]
fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let mut input: Option<PathBuf> = None;
    let mut origin = 0_u16;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Ok(ParseResult::Help);
        }

        if arg == "--origin" || arg == "-o" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --origin".to_string())?;
            origin = parse_origin(&value.to_string_lossy()).map_err(|e| e.to_string())?;
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if input.is_some() {
            return Err("multiple input paths provided".to_string());
        }
        input = Some(PathBuf::from(arg));
    }

    let input = input.ok_or_else(|| "missing input path".to_string())?;
    Ok(ParseResult::Command(DisasmArgs { input, origin }))
}

fn run_disasm(args: &DisasmArgs) -> Result<(), i32> {
    let rows = disassemble_file(&args.input, args.origin).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(render_listing(&rows).as_bytes())
        .map_err(|e| {
            eprintln!("error: failed to write listing: {e}");
            1
        })
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Command(args)) => match run_disasm(&args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!("{USAGE_TEXT}");
            1
        }
    };

    std::process::exit(exit_code);
}

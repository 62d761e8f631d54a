//! Minimal host loop: loads a program, wires a console port, and steps it
//! with tracing until `HLT`.
//!
//! ```sh
//! cargo run -p i8080-core --example run_program
//! ```

use i8080_core::{
    disassemble_one, load_image, new_address_space, step_one_traced, CoreConfig, CoreState, IoBus,
    IoError, StepOutcome, TraceEvent, TraceSink,
};
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

const CONSOLE_PORT: u8 = 0x01;
const STEP_LIMIT: usize = 10_000;

/// Prints "HI\n" through the console port, then halts.
const PROGRAM: [u8; 17] = [
    0x31, 0x00, 0x20, // LXI SP,0x2000
    0x3E, b'H', // MVI A,'H'
    0xD3, CONSOLE_PORT, // OUT 1
    0x3E, b'I', // MVI A,'I'
    0xD3, CONSOLE_PORT, // OUT 1
    0x3E, b'\n', // MVI A,'\n'
    0xD3, CONSOLE_PORT, // OUT 1
    0x76, // HLT
    0x00,
];

#[derive(Default)]
struct Console {
    output: String,
}

impl IoBus for Console {
    fn port_in(&mut self, _port: u8) -> Result<u8, IoError> {
        Ok(0)
    }

    fn port_out(&mut self, port: u8, value: u8) -> Result<(), IoError> {
        if port != CONSOLE_PORT {
            return Err(IoError::WriteFailed);
        }
        self.output.push(char::from(value));
        Ok(())
    }
}

struct Listing<'a> {
    memory: &'a [u8],
}

impl TraceSink for Listing<'_> {
    fn on_event(&mut self, event: TraceEvent) {
        match event {
            TraceEvent::InstructionStart { pc, .. } => {
                let start = usize::from(pc);
                if let Some(row) = self
                    .memory
                    .get(start..)
                    .and_then(|bytes| disassemble_one(pc, bytes))
                {
                    println!("{row}");
                }
            }
            TraceEvent::FaultRaised { cause, pc } => println!("fault at {pc:04x}: {cause}"),
            _ => {}
        }
    }
}

fn main() {
    let mut memory = new_address_space();
    if let Err(fault) = load_image(&mut memory, 0, &PROGRAM) {
        eprintln!("error: {fault}");
        std::process::exit(1);
    }
    let listing_copy = memory.clone();

    let config = CoreConfig {
        tracing_enabled: true,
        ..CoreConfig::default()
    };
    let mut state = CoreState::default();
    let mut console = Console::default();
    let mut listing = Listing {
        memory: &listing_copy,
    };

    for _ in 0..STEP_LIMIT {
        match step_one_traced(&mut state, &mut memory, &mut console, &config, &mut listing) {
            StepOutcome::Continue => {}
            StepOutcome::Halted => break,
            StepOutcome::Fault { cause } => {
                eprintln!("error: {cause}");
                std::process::exit(1);
            }
        }
    }

    print!("{}", console.output);
    println!("retired {} instructions", state.instructions_retired);
}

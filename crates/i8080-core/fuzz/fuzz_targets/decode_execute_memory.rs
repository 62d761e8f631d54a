#![no_main]

use i8080_core::{
    disassemble_all, request_interrupt, run, CoreConfig, CoreState, Decoder, NullIo,
    OpcodeProfile, StepOutcome,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    let pc = u16::from_le_bytes([data[0], data[1]]);
    let sp = u16::from_le_bytes([data[2], data[3]]);
    let image = &data[4..];

    let _ = disassemble_all(image, pc);
    let _ = Decoder::fetch(image, pc);

    // Short stores exercise out-of-bounds faults; the step must stay precise.
    let mut memory = image.to_vec();
    let mut state = CoreState::at(pc);
    state.arch.set_sp(sp);
    let config = CoreConfig {
        opcode_profile: if pc & 1 == 0 {
            OpcodeProfile::Permissive
        } else {
            OpcodeProfile::Strict
        },
        tracing_enabled: false,
    };

    let before = state.clone();
    let outcome = run(&mut state, &mut memory, &mut NullIo, &config, 256);
    if outcome.steps == 0 {
        if let StepOutcome::Fault { .. } = outcome.final_step {
            assert_eq!(state, before);
            assert_eq!(memory, image);
        }
    }

    state.arch.set_interrupt_enable(true);
    let _ = request_interrupt(&mut state, &mut memory, data[0]);
});

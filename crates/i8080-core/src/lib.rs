//! Instruction-execution engine for the Intel 8080.
//!
//! The host owns memory and I/O devices; the engine owns nothing but the
//! register file. One call to [`step_one`] fetches, decodes and executes a
//! single instruction and either commits all of its effects or none.

/// Memory port contract and host-side address-space helpers.
pub mod memory;
pub use memory::{
    load_image, new_address_space, read_u16_le, validate_access, MemoryPort, ADDRESS_SPACE_BYTES,
};

/// Pluggable I/O port capability.
pub mod io;
pub use io::{IoBus, IoError, NullIo};

/// Public host-facing API contract and integration types.
pub mod api;
pub use api::{
    CoreConfig, CoreState, OpcodeProfile, RunOutcome, StepOutcome, TraceEvent, TraceSink,
};

/// Architectural CPU state model primitives.
pub mod state;
pub use state::{
    ConditionFlags, Reg8, RegisterFile, RegisterPair, RunState, PSW_ALWAYS_SET, PSW_AUX_CARRY,
    PSW_CARRY, PSW_PARITY, PSW_SIGN, PSW_ZERO, REGISTER_COUNT,
};

/// Opcode length table.
pub mod encoding;
pub use encoding::{
    instruction_length, is_undocumented, opcode_encoding, OpcodeEncoding, OPCODE_TABLE,
    UNDOCUMENTED_OPCODES,
};

/// Decode-to-tagged-variant instruction decoder.
pub mod decoder;
pub use decoder::{
    AluOp, Condition, DecodedInstruction, Decoder, Instruction, Operand, RotateOp, StackPair,
    WidePair,
};

/// Fault taxonomy.
pub mod fault;
pub use fault::{Fault, FaultClass, PortDirection};

/// Instruction execution pipeline.
pub mod execute;
pub use execute::{
    commit_execution, execute_instruction, request_interrupt, run, step_one, step_one_traced,
    ExecuteState, StagedWrite,
};

/// Textual disassembly over the shared decoder.
pub mod disasm;
pub use disasm::{disassemble_all, disassemble_one, DisassemblyRow};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;

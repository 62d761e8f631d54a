//! Architectural CPU state model primitives.

/// Condition flags and PSW layout.
pub mod flags;
/// Register file types and pairing rules.
pub mod registers;
/// Host-observable run state.
pub mod run_state;

pub use flags::{
    ConditionFlags, PSW_ALWAYS_SET, PSW_AUX_CARRY, PSW_CARRY, PSW_PARITY, PSW_SIGN, PSW_ZERO,
};
pub use registers::{Reg8, RegisterFile, RegisterPair, REGISTER_COUNT};
pub use run_state::RunState;

//! Public host-facing API contracts for embedding the engine.

use crate::{Fault, RegisterFile, RunState};

/// Policy for the twelve officially-undefined opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum OpcodeProfile {
    /// Undefined opcodes execute as one-byte `NOP`s, as the physical part does.
    #[default]
    Permissive,
    /// Undefined opcodes raise [`Fault::UnimplementedOpcode`].
    Strict,
}

/// Top-level immutable configuration for a core instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreConfig {
    /// Handling of officially-undefined opcodes.
    pub opcode_profile: OpcodeProfile,
    /// Enables trace callback dispatch from [`crate::step_one_traced`].
    pub tracing_enabled: bool,
}

/// Complete host-visible core state used by stepping APIs.
///
/// Memory is not part of the state; it is owned by the host and passed to
/// every step.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreState {
    /// Architectural register file, flags and interrupt enable.
    pub arch: RegisterFile,
    /// Current execution state.
    pub run_state: RunState,
    /// Instructions retired since construction or the last reset.
    pub instructions_retired: u64,
}

impl CoreState {
    /// Creates a zero-initialised core positioned at `pc`.
    #[must_use]
    pub fn at(pc: u16) -> Self {
        let mut state = Self::default();
        state.arch.set_pc(pc);
        state
    }

    /// Restores power-on defaults: every register zero, `PC = 0x0000`,
    /// interrupts disabled, running.
    ///
    /// Host memory is untouched.
    pub fn reset(&mut self) {
        self.arch = RegisterFile::default();
        self.run_state = RunState::Running;
        self.instructions_retired = 0;
    }
}

/// Output status from one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// Instruction retired; the core is ready for the next step.
    Continue,
    /// `HLT` retired, or the core was already halted.
    Halted,
    /// Fault raised during fetch, decode or execute. No state was changed.
    Fault {
        /// Fault raised by the step.
        cause: Fault,
    },
}

/// Aggregated outcome from running multiple steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunOutcome {
    /// Instructions retired during this run call.
    pub steps: u64,
    /// Last step-level status observed before returning.
    pub final_step: StepOutcome,
}

/// Trace events emitted in commit order when tracing is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEvent {
    /// Instruction fetched and decoded.
    InstructionStart {
        /// Address of the opcode byte.
        pc: u16,
        /// Opcode byte.
        opcode: u8,
    },
    /// Byte accepted from an I/O port by `IN`.
    PortRead {
        /// Port number.
        port: u8,
        /// Value read.
        value: u8,
    },
    /// Byte committed to memory.
    MemoryWrite {
        /// Target address.
        addr: u16,
        /// Value written.
        value: u8,
    },
    /// Byte sent to an I/O port by `OUT`.
    PortWrite {
        /// Port number.
        port: u8,
        /// Value written.
        value: u8,
    },
    /// Instruction retired.
    InstructionRetired {
        /// Address of the retired instruction.
        pc: u16,
        /// Resolved program counter after the step.
        next_pc: u16,
    },
    /// Fault raised; nothing from the step was committed.
    FaultRaised {
        /// Raised fault.
        cause: Fault,
        /// Program counter at the start of the step.
        pc: u16,
    },
}

/// Sink trait for deterministic trace hooks.
pub trait TraceSink {
    /// Records an event in execution order.
    fn on_event(&mut self, event: TraceEvent);
}

impl TraceSink for Vec<TraceEvent> {
    fn on_event(&mut self, event: TraceEvent) {
        self.push(event);
    }
}

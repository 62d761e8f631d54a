//! Instruction execution pipeline for the 8080.
//!
//! Every step runs in two phases:
//! 1. Execute: read operands, compute results, validate every pending
//!    memory write, and stage all side effects in an [`ExecuteState`].
//! 2. Commit: send staged port output, then write memory, registers,
//!    flags, SP, interrupt enable, and finally the single resolved PC.
//!
//! A step that faults during execute leaves no side effects behind.

#![allow(clippy::missing_const_for_fn, clippy::too_many_lines)]

/// ALU / flag unit.
pub mod alu;

use crate::decoder::{
    AluOp, DecodedInstruction, Decoder, Instruction, Operand, StackPair, WidePair,
};
use crate::memory::{read_u16_le, validate_access, MemoryPort};
use crate::state::{ConditionFlags, Reg8, RegisterFile, RegisterPair, REGISTER_COUNT};
use crate::{
    CoreConfig, CoreState, Fault, IoBus, OpcodeProfile, PortDirection, RunOutcome, RunState,
    StepOutcome, TraceEvent, TraceSink,
};

/// The single memory write an instruction may stage, already validated
/// against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagedWrite {
    /// One byte at `addr`.
    Byte {
        /// Target address.
        addr: u16,
        /// Byte to store.
        value: u8,
    },
    /// Little-endian word: low byte at `addr`, high byte at `addr + 1`.
    Word {
        /// Address of the low byte.
        addr: u16,
        /// Word to store.
        value: u16,
    },
}

impl StagedWrite {
    /// Validates `addr` and builds a byte write.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::OutOfBoundsAccess`] when `addr` is outside the store.
    pub fn byte<M: MemoryPort + ?Sized>(
        memory: &M,
        addr: u16,
        value: u8,
    ) -> Result<Self, Fault> {
        validate_access(memory, addr)?;
        Ok(Self::Byte { addr, value })
    }

    /// Validates both addresses, high byte first, and builds a word write.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::OutOfBoundsAccess`] naming the first address outside
    /// the store.
    pub fn word<M: MemoryPort + ?Sized>(
        memory: &M,
        addr: u16,
        value: u16,
    ) -> Result<Self, Fault> {
        validate_access(memory, addr.wrapping_add(1))?;
        validate_access(memory, addr)?;
        Ok(Self::Word { addr, value })
    }

    /// Byte writes in commit order; a word commits its high byte first.
    pub fn bytes(self) -> impl Iterator<Item = (u16, u8)> {
        let (first, second) = match self {
            Self::Byte { addr, value } => ((addr, value), None),
            Self::Word { addr, value } => {
                let [lo, hi] = value.to_le_bytes();
                ((addr.wrapping_add(1), hi), Some((addr, lo)))
            }
        };
        std::iter::once(first).chain(second)
    }
}

/// Side effects accumulated during execute and applied together at commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecuteState {
    /// Pending 8-bit register writes, indexed by [`Reg8::index`].
    pub registers: [Option<u8>; REGISTER_COUNT],
    /// Replacement flags.
    pub flags: Option<ConditionFlags>,
    /// New stack pointer.
    pub sp: Option<u16>,
    /// Validated memory write.
    pub memory_write: Option<StagedWrite>,
    /// Port and value accepted by `IN`.
    pub port_read: Option<(u8, u8)>,
    /// Port and value to send for `OUT`.
    pub port_write: Option<(u8, u8)>,
    /// New interrupt-enable latch.
    pub interrupt_enable: Option<bool>,
    /// Program counter after the step, resolved exactly once.
    pub next_pc: u16,
    /// `HLT` retired.
    pub halt: bool,
}

impl ExecuteState {
    /// Creates an empty staging record that falls through to `next_pc`.
    #[must_use]
    pub fn new(next_pc: u16) -> Self {
        Self {
            next_pc,
            ..Self::default()
        }
    }

    /// Stages an 8-bit register write.
    pub fn set_reg(&mut self, reg: Reg8, value: u8) {
        self.registers[reg.index()] = Some(value);
    }

    /// Stages a register-pair write (high register first).
    pub fn set_pair(&mut self, pair: RegisterPair, value: u16) {
        let (hi, lo) = pair.halves();
        let [hi_value, lo_value] = value.to_be_bytes();
        self.set_reg(hi, hi_value);
        self.set_reg(lo, lo_value);
    }

    /// Staged memory writes in commit order.
    pub fn staged_writes(&self) -> impl Iterator<Item = (u16, u8)> {
        self.memory_write.into_iter().flat_map(StagedWrite::bytes)
    }
}

/// Executes one decoded instruction against a read-only view of the core
/// and stages its effects.
///
/// Only `IN` touches the outside world here, and it stages no memory writes.
///
/// # Errors
///
/// Returns the fault the instruction raises; nothing has been committed.
pub fn execute_instruction<M: MemoryPort + ?Sized>(
    instr: &DecodedInstruction,
    state: &CoreState,
    memory: &M,
    io: &mut dyn IoBus,
    config: &CoreConfig,
) -> Result<ExecuteState, Fault> {
    let arch = &state.arch;
    let flags = arch.flags();
    let a = arch.a();
    let sp = arch.sp();
    let fall_through = instr.fall_through();
    let mut exec = ExecuteState::new(fall_through);

    match instr.instruction {
        Instruction::Nop => {}
        Instruction::Undocumented(opcode) => {
            if config.opcode_profile == OpcodeProfile::Strict {
                return Err(Fault::UnimplementedOpcode {
                    opcode,
                    address: instr.address,
                });
            }
        }
        // Needs auxiliary carry, which no instruction here computes.
        Instruction::Daa => {
            return Err(Fault::UnimplementedOpcode {
                opcode: instr.opcode(),
                address: instr.address,
            });
        }
        Instruction::Lxi { pair, value } => set_wide(&mut exec, pair, value),
        Instruction::Stax(pair) => {
            exec.memory_write = Some(StagedWrite::byte(memory, arch.pair(pair), a)?);
        }
        Instruction::Ldax(pair) => exec.set_reg(Reg8::A, memory.read_byte(arch.pair(pair))?),
        Instruction::Inx(pair) => set_wide(&mut exec, pair, wide_value(arch, pair).wrapping_add(1)),
        Instruction::Dcx(pair) => set_wide(&mut exec, pair, wide_value(arch, pair).wrapping_sub(1)),
        Instruction::Dad(pair) => {
            let hl = arch.pair(RegisterPair::HL);
            let (value, flags) = alu::dad(flags, hl, wide_value(arch, pair));
            exec.set_pair(RegisterPair::HL, value);
            exec.flags = Some(flags);
        }
        Instruction::Inr(operand) => {
            let result = alu::inr(flags, read_operand(arch, memory, operand)?);
            write_operand(&mut exec, arch, memory, operand, result.value)?;
            exec.flags = Some(result.flags);
        }
        Instruction::Dcr(operand) => {
            let result = alu::dcr(flags, read_operand(arch, memory, operand)?);
            write_operand(&mut exec, arch, memory, operand, result.value)?;
            exec.flags = Some(result.flags);
        }
        Instruction::Mvi { dst, value } => write_operand(&mut exec, arch, memory, dst, value)?,
        Instruction::Rotate(op) => {
            let result = alu::rotate(op, flags, a);
            exec.set_reg(Reg8::A, result.value);
            exec.flags = Some(result.flags);
        }
        Instruction::Shld(addr) => {
            let hl = arch.pair(RegisterPair::HL);
            exec.memory_write = Some(StagedWrite::word(memory, addr, hl)?);
        }
        Instruction::Lhld(addr) => exec.set_pair(RegisterPair::HL, read_u16_le(memory, addr)?),
        Instruction::Sta(addr) => exec.memory_write = Some(StagedWrite::byte(memory, addr, a)?),
        Instruction::Lda(addr) => exec.set_reg(Reg8::A, memory.read_byte(addr)?),
        Instruction::Cma => exec.set_reg(Reg8::A, !a),
        Instruction::Stc => {
            exec.flags = Some(ConditionFlags {
                carry: true,
                ..flags
            });
        }
        Instruction::Cmc => {
            exec.flags = Some(ConditionFlags {
                carry: !flags.carry,
                ..flags
            });
        }
        Instruction::Mov { dst, src } => {
            let value = read_operand(arch, memory, src)?;
            write_operand(&mut exec, arch, memory, dst, value)?;
        }
        Instruction::Hlt => exec.halt = true,
        Instruction::Alu { op, src } => {
            let operand = read_operand(arch, memory, src)?;
            stage_accumulate(&mut exec, op, flags, a, operand);
        }
        Instruction::AluImmediate { op, value } => stage_accumulate(&mut exec, op, flags, a, value),
        Instruction::Ret => exec.next_pc = stage_pop(&mut exec, memory, sp)?,
        Instruction::RetIf(condition) => {
            if alu::condition_holds(condition, flags) {
                exec.next_pc = stage_pop(&mut exec, memory, sp)?;
            }
        }
        Instruction::Pop(StackPair::Pair(pair)) => {
            let value = stage_pop(&mut exec, memory, sp)?;
            exec.set_pair(pair, value);
        }
        Instruction::Pop(StackPair::Psw) => {
            let [acc, psw] = stage_pop(&mut exec, memory, sp)?.to_be_bytes();
            exec.set_reg(Reg8::A, acc);
            exec.flags = Some(ConditionFlags::from_psw(psw));
        }
        Instruction::Push(StackPair::Pair(pair)) => {
            stage_push(&mut exec, memory, sp, arch.pair(pair))?;
        }
        Instruction::Push(StackPair::Psw) => {
            stage_push(&mut exec, memory, sp, u16::from_be_bytes([a, flags.to_psw()]))?;
        }
        Instruction::Jmp(target) => exec.next_pc = target,
        Instruction::JmpIf(condition, target) => {
            if alu::condition_holds(condition, flags) {
                exec.next_pc = target;
            }
        }
        Instruction::Call(target) => {
            stage_push(&mut exec, memory, sp, fall_through)?;
            exec.next_pc = target;
        }
        Instruction::CallIf(condition, target) => {
            if alu::condition_holds(condition, flags) {
                stage_push(&mut exec, memory, sp, fall_through)?;
                exec.next_pc = target;
            }
        }
        Instruction::Rst(vector) => {
            stage_push(&mut exec, memory, sp, fall_through)?;
            exec.next_pc = rst_target(vector);
        }
        Instruction::Out(port) => exec.port_write = Some((port, a)),
        Instruction::In(port) => {
            let value = io.port_in(port).map_err(|_| Fault::IoPortFailure {
                port,
                direction: PortDirection::Input,
            })?;
            exec.set_reg(Reg8::A, value);
            exec.port_read = Some((port, value));
        }
        Instruction::Xthl => {
            let top = read_u16_le(memory, sp)?;
            let hl = arch.pair(RegisterPair::HL);
            exec.memory_write = Some(StagedWrite::word(memory, sp, hl)?);
            exec.set_pair(RegisterPair::HL, top);
        }
        Instruction::Pchl => exec.next_pc = arch.pair(RegisterPair::HL),
        Instruction::Xchg => {
            exec.set_pair(RegisterPair::HL, arch.pair(RegisterPair::DE));
            exec.set_pair(RegisterPair::DE, arch.pair(RegisterPair::HL));
        }
        Instruction::Sphl => exec.sp = Some(arch.pair(RegisterPair::HL)),
        Instruction::Di => exec.interrupt_enable = Some(false),
        Instruction::Ei => exec.interrupt_enable = Some(true),
    }

    Ok(exec)
}

/// Applies staged side effects to the core and host memory.
///
/// Port output goes first so a failing device leaves the core untouched;
/// memory writes were validated during execute.
///
/// # Errors
///
/// Returns [`Fault::IoPortFailure`] when the I/O bus rejects an `OUT`.
pub fn commit_execution<M: MemoryPort + ?Sized>(
    state: &mut CoreState,
    memory: &mut M,
    io: &mut dyn IoBus,
    exec: &ExecuteState,
) -> Result<(), Fault> {
    if let Some((port, value)) = exec.port_write {
        io.port_out(port, value).map_err(|_| Fault::IoPortFailure {
            port,
            direction: PortDirection::Output,
        })?;
    }
    apply_staged(state, memory, exec)?;
    state.instructions_retired = state.instructions_retired.wrapping_add(1);
    Ok(())
}

fn apply_staged<M: MemoryPort + ?Sized>(
    state: &mut CoreState,
    memory: &mut M,
    exec: &ExecuteState,
) -> Result<(), Fault> {
    for (addr, value) in exec.staged_writes() {
        memory.write_byte(addr, value)?;
    }
    for reg in Reg8::ALL {
        if let Some(value) = exec.registers[reg.index()] {
            state.arch.set_reg(reg, value);
        }
    }
    if let Some(flags) = exec.flags {
        state.arch.set_flags(flags);
    }
    if let Some(sp) = exec.sp {
        state.arch.set_sp(sp);
    }
    if let Some(enabled) = exec.interrupt_enable {
        state.arch.set_interrupt_enable(enabled);
    }
    state.arch.set_pc(exec.next_pc);
    if exec.halt {
        state.run_state = RunState::Halted;
    }
    Ok(())
}

/// Executes exactly one instruction at `PC`.
///
/// A halted core executes nothing and reports [`StepOutcome::Halted`] until
/// an interrupt is accepted or the host resets it.
pub fn step_one<M: MemoryPort + ?Sized>(
    state: &mut CoreState,
    memory: &mut M,
    io: &mut dyn IoBus,
    config: &CoreConfig,
) -> StepOutcome {
    step_with_sink(state, memory, io, config, None)
}

/// Same as [`step_one`], additionally reporting [`TraceEvent`]s to `sink`
/// when [`CoreConfig::tracing_enabled`] is set.
pub fn step_one_traced<M: MemoryPort + ?Sized>(
    state: &mut CoreState,
    memory: &mut M,
    io: &mut dyn IoBus,
    config: &CoreConfig,
    sink: &mut dyn TraceSink,
) -> StepOutcome {
    let sink = if config.tracing_enabled {
        Some(sink)
    } else {
        None
    };
    step_with_sink(state, memory, io, config, sink)
}

fn step_with_sink<M: MemoryPort + ?Sized>(
    state: &mut CoreState,
    memory: &mut M,
    io: &mut dyn IoBus,
    config: &CoreConfig,
    mut sink: Option<&mut dyn TraceSink>,
) -> StepOutcome {
    if state.run_state.is_halted() {
        return StepOutcome::Halted;
    }

    let pc = state.arch.pc();
    match try_step(state, memory, io, config, &mut sink) {
        Ok(()) if state.run_state.is_halted() => StepOutcome::Halted,
        Ok(()) => StepOutcome::Continue,
        Err(cause) => {
            emit(&mut sink, TraceEvent::FaultRaised { cause, pc });
            StepOutcome::Fault { cause }
        }
    }
}

fn try_step<M: MemoryPort + ?Sized>(
    state: &mut CoreState,
    memory: &mut M,
    io: &mut dyn IoBus,
    config: &CoreConfig,
    sink: &mut Option<&mut dyn TraceSink>,
) -> Result<(), Fault> {
    let instr = Decoder::fetch(&*memory, state.arch.pc())?;
    emit(
        sink,
        TraceEvent::InstructionStart {
            pc: instr.address,
            opcode: instr.opcode(),
        },
    );

    let exec = execute_instruction(&instr, state, &*memory, io, config)?;
    commit_execution(state, memory, io, &exec)?;

    if let Some((port, value)) = exec.port_read {
        emit(sink, TraceEvent::PortRead { port, value });
    }
    for (addr, value) in exec.staged_writes() {
        emit(sink, TraceEvent::MemoryWrite { addr, value });
    }
    if let Some((port, value)) = exec.port_write {
        emit(sink, TraceEvent::PortWrite { port, value });
    }
    emit(
        sink,
        TraceEvent::InstructionRetired {
            pc: instr.address,
            next_pc: exec.next_pc,
        },
    );
    Ok(())
}

fn emit(sink: &mut Option<&mut dyn TraceSink>, event: TraceEvent) {
    if let Some(sink) = sink.as_deref_mut() {
        sink.on_event(event);
    }
}

/// Steps until an outcome other than [`StepOutcome::Continue`] or until
/// `max_steps` steps have been attempted.
pub fn run<M: MemoryPort + ?Sized>(
    state: &mut CoreState,
    memory: &mut M,
    io: &mut dyn IoBus,
    config: &CoreConfig,
    max_steps: u64,
) -> RunOutcome {
    let start = state.instructions_retired;
    let mut final_step = StepOutcome::Continue;
    for _ in 0..max_steps {
        final_step = step_one(state, memory, io, config);
        if final_step != StepOutcome::Continue {
            break;
        }
    }

    RunOutcome {
        steps: state.instructions_retired.wrapping_sub(start),
        final_step,
    }
}

/// Delivers a maskable interrupt as if `RST vector` were issued at the
/// current PC. Only the low three bits of `vector` are used.
///
/// Returns `Ok(false)` and changes nothing while interrupts are disabled.
/// On acceptance the current PC is pushed, interrupts are disabled, and a
/// halted core resumes.
///
/// # Errors
///
/// Returns [`Fault::OutOfBoundsAccess`] when the return address cannot be
/// pushed; the core is left unchanged.
pub fn request_interrupt<M: MemoryPort + ?Sized>(
    state: &mut CoreState,
    memory: &mut M,
    vector: u8,
) -> Result<bool, Fault> {
    if !state.arch.interrupt_enable() {
        return Ok(false);
    }

    let mut exec = ExecuteState::new(rst_target(vector));
    stage_push(&mut exec, &*memory, state.arch.sp(), state.arch.pc())?;
    exec.interrupt_enable = Some(false);
    apply_staged(state, memory, &exec)?;
    state.run_state = RunState::Running;
    Ok(true)
}

fn rst_target(vector: u8) -> u16 {
    u16::from(vector & 0x07) << 3
}

fn read_operand<M: MemoryPort + ?Sized>(
    arch: &RegisterFile,
    memory: &M,
    operand: Operand,
) -> Result<u8, Fault> {
    match operand {
        Operand::Reg(reg) => Ok(arch.reg(reg)),
        Operand::Memory => memory.read_byte(arch.pair(RegisterPair::HL)),
    }
}

fn write_operand<M: MemoryPort + ?Sized>(
    exec: &mut ExecuteState,
    arch: &RegisterFile,
    memory: &M,
    operand: Operand,
    value: u8,
) -> Result<(), Fault> {
    match operand {
        Operand::Reg(reg) => {
            exec.set_reg(reg, value);
            Ok(())
        }
        Operand::Memory => {
            let addr = arch.pair(RegisterPair::HL);
            exec.memory_write = Some(StagedWrite::byte(memory, addr, value)?);
            Ok(())
        }
    }
}

fn stage_accumulate(
    exec: &mut ExecuteState,
    op: AluOp,
    flags: ConditionFlags,
    a: u8,
    operand: u8,
) {
    let result = alu::accumulate(op, flags, a, operand);
    if op != AluOp::Cmp {
        exec.set_reg(Reg8::A, result.value);
    }
    exec.flags = Some(result.flags);
}

const fn wide_as_pair(pair: WidePair) -> Option<RegisterPair> {
    match pair {
        WidePair::BC => Some(RegisterPair::BC),
        WidePair::DE => Some(RegisterPair::DE),
        WidePair::HL => Some(RegisterPair::HL),
        WidePair::SP => None,
    }
}

const fn wide_value(arch: &RegisterFile, pair: WidePair) -> u16 {
    match wide_as_pair(pair) {
        Some(pair) => arch.pair(pair),
        None => arch.sp(),
    }
}

fn set_wide(exec: &mut ExecuteState, pair: WidePair, value: u16) {
    match wide_as_pair(pair) {
        Some(pair) => exec.set_pair(pair, value),
        None => exec.sp = Some(value),
    }
}

/// High byte to `sp-1`, low byte to `sp-2`, then `sp -= 2`.
fn stage_push<M: MemoryPort + ?Sized>(
    exec: &mut ExecuteState,
    memory: &M,
    sp: u16,
    value: u16,
) -> Result<(), Fault> {
    let top = sp.wrapping_sub(2);
    exec.memory_write = Some(StagedWrite::word(memory, top, value)?);
    exec.sp = Some(top);
    Ok(())
}

/// Low byte from `sp`, high byte from `sp+1`, then `sp += 2`.
fn stage_pop<M: MemoryPort + ?Sized>(
    exec: &mut ExecuteState,
    memory: &M,
    sp: u16,
) -> Result<u16, Fault> {
    let value = read_u16_le(memory, sp)?;
    exec.sp = Some(sp.wrapping_add(2));
    Ok(value)
}

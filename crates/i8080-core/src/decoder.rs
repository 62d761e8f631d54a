//! Instruction decoder for the 8080 ISA.
//!
//! Decoding splits the opcode byte into its `yyy`/`zzz`/`pp` fields and
//! produces a tagged [`Instruction`] so the executor dispatches once over
//! variants instead of over 256 inline arms.

use crate::encoding::{instruction_length, is_undocumented};
use crate::memory::MemoryPort;
use crate::state::{Reg8, RegisterPair};
use crate::Fault;

/// 3-bit source/destination operand field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    /// An 8-bit register.
    Reg(Reg8),
    /// The byte addressed by `HL`.
    Memory,
}

impl Operand {
    /// Decodes a 3-bit operand field (`B C D E H L M A`).
    #[must_use]
    pub const fn from_u3(bits: u8) -> Self {
        match bits & 0x07 {
            0 => Self::Reg(Reg8::B),
            1 => Self::Reg(Reg8::C),
            2 => Self::Reg(Reg8::D),
            3 => Self::Reg(Reg8::E),
            4 => Self::Reg(Reg8::H),
            5 => Self::Reg(Reg8::L),
            6 => Self::Memory,
            _ => Self::Reg(Reg8::A),
        }
    }

    /// Assembly name of the operand.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Reg(reg) => reg.name(),
            Self::Memory => "M",
        }
    }
}

/// 2-bit register-pair field used by `LXI`, `INX`, `DCX` and `DAD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum WidePair {
    BC,
    DE,
    HL,
    SP,
}

impl WidePair {
    /// Decodes a 2-bit pair field.
    #[must_use]
    pub const fn from_u2(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Self::BC,
            1 => Self::DE,
            2 => Self::HL,
            _ => Self::SP,
        }
    }

    /// Assembly name of the pair.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BC => "B",
            Self::DE => "D",
            Self::HL => "H",
            Self::SP => "SP",
        }
    }
}

/// 2-bit register-pair field used by `PUSH` and `POP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackPair {
    /// A general register pair.
    Pair(RegisterPair),
    /// Accumulator plus processor status word.
    Psw,
}

impl StackPair {
    /// Decodes a 2-bit pair field.
    #[must_use]
    pub const fn from_u2(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Self::Pair(RegisterPair::BC),
            1 => Self::Pair(RegisterPair::DE),
            2 => Self::Pair(RegisterPair::HL),
            _ => Self::Psw,
        }
    }

    /// Assembly name of the pair.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pair(RegisterPair::BC) => "B",
            Self::Pair(RegisterPair::DE) => "D",
            Self::Pair(RegisterPair::HL) => "H",
            Self::Psw => "PSW",
        }
    }
}

/// Condition codes gating conditional jump, call and return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    /// Zero clear.
    NotZero,
    /// Zero set.
    Zero,
    /// Carry clear.
    NoCarry,
    /// Carry set.
    Carry,
    /// Parity clear (odd).
    ParityOdd,
    /// Parity set (even).
    ParityEven,
    /// Sign clear.
    Plus,
    /// Sign set.
    Minus,
}

impl Condition {
    /// Decodes a 3-bit condition field.
    #[must_use]
    pub const fn from_u3(bits: u8) -> Self {
        match bits & 0x07 {
            0 => Self::NotZero,
            1 => Self::Zero,
            2 => Self::NoCarry,
            3 => Self::Carry,
            4 => Self::ParityOdd,
            5 => Self::ParityEven,
            6 => Self::Plus,
            _ => Self::Minus,
        }
    }

    /// Mnemonic suffix (`NZ`, `Z`, `NC`, ...).
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::NotZero => "NZ",
            Self::Zero => "Z",
            Self::NoCarry => "NC",
            Self::Carry => "C",
            Self::ParityOdd => "PO",
            Self::ParityEven => "PE",
            Self::Plus => "P",
            Self::Minus => "M",
        }
    }
}

/// Accumulator operations sharing the `10ooosss` / `11ooo110` encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbb,
    Ana,
    Xra,
    Ora,
    Cmp,
}

impl AluOp {
    /// Decodes a 3-bit operation field.
    #[must_use]
    pub const fn from_u3(bits: u8) -> Self {
        match bits & 0x07 {
            0 => Self::Add,
            1 => Self::Adc,
            2 => Self::Sub,
            3 => Self::Sbb,
            4 => Self::Ana,
            5 => Self::Xra,
            6 => Self::Ora,
            _ => Self::Cmp,
        }
    }

    /// Register/memory form mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Adc => "ADC",
            Self::Sub => "SUB",
            Self::Sbb => "SBB",
            Self::Ana => "ANA",
            Self::Xra => "XRA",
            Self::Ora => "ORA",
            Self::Cmp => "CMP",
        }
    }

    /// Immediate form mnemonic.
    #[must_use]
    pub const fn immediate_mnemonic(self) -> &'static str {
        match self {
            Self::Add => "ADI",
            Self::Adc => "ACI",
            Self::Sub => "SUI",
            Self::Sbb => "SBI",
            Self::Ana => "ANI",
            Self::Xra => "XRI",
            Self::Ora => "ORI",
            Self::Cmp => "CPI",
        }
    }
}

/// Accumulator rotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum RotateOp {
    Rlc,
    Rrc,
    Ral,
    Rar,
}

/// Decoded 8080 instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Instruction {
    Nop,
    Lxi { pair: WidePair, value: u16 },
    Stax(RegisterPair),
    Ldax(RegisterPair),
    Inx(WidePair),
    Dcx(WidePair),
    Dad(WidePair),
    Inr(Operand),
    Dcr(Operand),
    Mvi { dst: Operand, value: u8 },
    Rotate(RotateOp),
    Shld(u16),
    Lhld(u16),
    Sta(u16),
    Lda(u16),
    Daa,
    Cma,
    Stc,
    Cmc,
    Mov { dst: Operand, src: Operand },
    Hlt,
    Alu { op: AluOp, src: Operand },
    AluImmediate { op: AluOp, value: u8 },
    Ret,
    RetIf(Condition),
    Pop(StackPair),
    Push(StackPair),
    Jmp(u16),
    JmpIf(Condition, u16),
    Call(u16),
    CallIf(Condition, u16),
    Rst(u8),
    Out(u8),
    In(u8),
    Xthl,
    Pchl,
    Xchg,
    Sphl,
    Di,
    Ei,
    /// One of the officially-undefined opcodes.
    Undocumented(u8),
}

/// Instruction bytes fetched at one address together with their decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodedInstruction {
    /// Address of the opcode byte.
    pub address: u16,
    /// Raw bytes; only the first `length` are meaningful.
    pub bytes: [u8; 3],
    /// Encoded length in bytes (`1..=3`).
    pub length: u8,
    /// Tagged decoding.
    pub instruction: Instruction,
}

impl DecodedInstruction {
    /// Opcode byte.
    #[must_use]
    pub const fn opcode(&self) -> u8 {
        self.bytes[0]
    }

    /// The meaningful instruction bytes.
    #[must_use]
    pub fn encoded(&self) -> &[u8] {
        &self.bytes[..usize::from(self.length)]
    }

    /// Address of the next sequential instruction.
    #[must_use]
    pub fn fall_through(&self) -> u16 {
        self.address.wrapping_add(u16::from(self.length))
    }
}

/// Instruction decoder for the 8080 ISA.
pub struct Decoder;

impl Decoder {
    /// Decodes up to three bytes fetched at `address`.
    ///
    /// Operand bytes beyond the opcode's encoded length are ignored.
    #[must_use]
    pub const fn decode(address: u16, bytes: [u8; 3]) -> DecodedInstruction {
        let opcode = bytes[0];
        let length = instruction_length(opcode);
        let imm8 = bytes[1];
        let imm16 = u16::from_le_bytes([bytes[1], bytes[2]]);

        DecodedInstruction {
            address,
            bytes,
            length,
            instruction: decode_opcode(opcode, imm8, imm16),
        }
    }

    /// Fetches and decodes the instruction at `pc`, reading exactly its
    /// encoded length. Operand addresses wrap at 64 KiB.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::OutOfBoundsAccess`] for the first byte outside the
    /// store.
    pub fn fetch<M: MemoryPort + ?Sized>(
        memory: &M,
        pc: u16,
    ) -> Result<DecodedInstruction, Fault> {
        let opcode = memory.read_byte(pc)?;
        let mut bytes = [opcode, 0, 0];
        let length = instruction_length(opcode);
        for offset in 1..length {
            bytes[usize::from(offset)] = memory.read_byte(pc.wrapping_add(u16::from(offset)))?;
        }
        Ok(Self::decode(pc, bytes))
    }
}

const fn decode_opcode(op: u8, imm8: u8, imm16: u16) -> Instruction {
    let y = (op >> 3) & 0x07;
    let z = op & 0x07;
    let p = (op >> 4) & 0x03;

    match op {
        0x00 => Instruction::Nop,
        0x76 => Instruction::Hlt,
        0x40..=0x7F => Instruction::Mov {
            dst: Operand::from_u3(y),
            src: Operand::from_u3(z),
        },
        0x80..=0xBF => Instruction::Alu {
            op: AluOp::from_u3(y),
            src: Operand::from_u3(z),
        },
        0x02 => Instruction::Stax(RegisterPair::BC),
        0x12 => Instruction::Stax(RegisterPair::DE),
        0x0A => Instruction::Ldax(RegisterPair::BC),
        0x1A => Instruction::Ldax(RegisterPair::DE),
        0x22 => Instruction::Shld(imm16),
        0x2A => Instruction::Lhld(imm16),
        0x32 => Instruction::Sta(imm16),
        0x3A => Instruction::Lda(imm16),
        0x07 => Instruction::Rotate(RotateOp::Rlc),
        0x0F => Instruction::Rotate(RotateOp::Rrc),
        0x17 => Instruction::Rotate(RotateOp::Ral),
        0x1F => Instruction::Rotate(RotateOp::Rar),
        0x27 => Instruction::Daa,
        0x2F => Instruction::Cma,
        0x37 => Instruction::Stc,
        0x3F => Instruction::Cmc,
        0xC3 => Instruction::Jmp(imm16),
        0xC9 => Instruction::Ret,
        0xCD => Instruction::Call(imm16),
        0xD3 => Instruction::Out(imm8),
        0xDB => Instruction::In(imm8),
        0xE3 => Instruction::Xthl,
        0xE9 => Instruction::Pchl,
        0xEB => Instruction::Xchg,
        0xF3 => Instruction::Di,
        0xF9 => Instruction::Sphl,
        0xFB => Instruction::Ei,
        _ if is_undocumented(op) => Instruction::Undocumented(op),
        0x01..=0x3F => match z {
            1 if op & 0x08 == 0 => Instruction::Lxi {
                pair: WidePair::from_u2(p),
                value: imm16,
            },
            1 => Instruction::Dad(WidePair::from_u2(p)),
            3 if op & 0x08 == 0 => Instruction::Inx(WidePair::from_u2(p)),
            3 => Instruction::Dcx(WidePair::from_u2(p)),
            4 => Instruction::Inr(Operand::from_u3(y)),
            5 => Instruction::Dcr(Operand::from_u3(y)),
            6 => Instruction::Mvi {
                dst: Operand::from_u3(y),
                value: imm8,
            },
            _ => Instruction::Undocumented(op),
        },
        _ => match z {
            0 => Instruction::RetIf(Condition::from_u3(y)),
            1 => Instruction::Pop(StackPair::from_u2(p)),
            2 => Instruction::JmpIf(Condition::from_u3(y), imm16),
            4 => Instruction::CallIf(Condition::from_u3(y), imm16),
            5 => Instruction::Push(StackPair::from_u2(p)),
            6 => Instruction::AluImmediate {
                op: AluOp::from_u3(y),
                value: imm8,
            },
            7 => Instruction::Rst(y),
            _ => Instruction::Undocumented(op),
        },
    }
}

//! Instruction disassembly for the 8080.
//!
//! Rows are produced by the same [`Decoder`] the executor uses, so the
//! listing and execution never disagree on instruction lengths.

use std::fmt;

use crate::decoder::{Decoder, Instruction, RotateOp};
use crate::encoding::instruction_length;
use crate::state::RegisterPair;

/// A single disassembled instruction row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DisassemblyRow {
    /// Address of the first byte of this row.
    pub addr_start: u16,
    /// Bytes consumed by this row (`1..=3`).
    pub len_bytes: u8,
    /// The consumed bytes.
    pub bytes: Vec<u8>,
    /// Mnemonic, e.g. `MVI`, `JNZ`, `DB`.
    pub mnemonic: String,
    /// Formatted operands, empty when the instruction has none.
    pub operands: String,
    /// The instruction's operand bytes ran past the end of the buffer; the
    /// row holds a single `DB` byte instead.
    pub is_truncated: bool,
}

impl fmt::Display for DisassemblyRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operands.is_empty() {
            write!(f, "{:04x} {}", self.addr_start, self.mnemonic)
        } else {
            write!(
                f,
                "{:04x} {}\t{}",
                self.addr_start, self.mnemonic, self.operands
            )
        }
    }
}

/// Disassembles the instruction whose first byte is `bytes[0]`, labelling
/// it with `addr`.
///
/// Returns `None` for an empty slice. When the opcode needs more bytes than
/// remain, a one-byte `DB` row is returned with `is_truncated` set.
#[must_use]
pub fn disassemble_one(addr: u16, bytes: &[u8]) -> Option<DisassemblyRow> {
    let opcode = *bytes.first()?;
    let length = usize::from(instruction_length(opcode));

    let Some(encoded) = bytes.get(..length) else {
        return Some(data_byte(addr, opcode));
    };

    let mut raw = [0_u8; 3];
    raw[..length].copy_from_slice(encoded);
    let decoded = Decoder::decode(addr, raw);
    let (mnemonic, operands) = format_instruction(decoded.instruction);

    Some(DisassemblyRow {
        addr_start: addr,
        len_bytes: decoded.length,
        bytes: encoded.to_vec(),
        mnemonic,
        operands,
        is_truncated: false,
    })
}

/// Disassembles a whole buffer loaded at `origin`.
///
/// The summed `len_bytes` of the returned rows always equals `bytes.len()`.
/// Once an instruction is truncated, every remaining byte is listed as its
/// own `DB` row.
#[must_use]
pub fn disassemble_all(bytes: &[u8], origin: u16) -> Vec<DisassemblyRow> {
    let mut rows = Vec::new();
    let mut offset = 0_usize;
    let mut addr = origin;

    while let Some(row) = bytes
        .get(offset..)
        .and_then(|rest| disassemble_one(addr, rest))
    {
        if row.is_truncated {
            break;
        }
        offset += usize::from(row.len_bytes);
        addr = addr.wrapping_add(u16::from(row.len_bytes));
        rows.push(row);
    }

    for &byte in bytes.get(offset..).unwrap_or_default() {
        rows.push(data_byte(addr, byte));
        addr = addr.wrapping_add(1);
    }

    rows
}

fn data_byte(addr: u16, byte: u8) -> DisassemblyRow {
    DisassemblyRow {
        addr_start: addr,
        len_bytes: 1,
        bytes: vec![byte],
        mnemonic: "DB".to_owned(),
        operands: format!("${byte:02x}"),
        is_truncated: true,
    }
}

fn format_instruction(instruction: Instruction) -> (String, String) {
    match instruction {
        Instruction::Nop | Instruction::Undocumented(_) => ("NOP".into(), String::new()),
        Instruction::Lxi { pair, value } => {
            ("LXI".into(), format!("{}, #${value:04x}", pair.name()))
        }
        Instruction::Stax(pair) => ("STAX".into(), pair_name(pair).into()),
        Instruction::Ldax(pair) => ("LDAX".into(), pair_name(pair).into()),
        Instruction::Inx(pair) => ("INX".into(), pair.name().into()),
        Instruction::Dcx(pair) => ("DCX".into(), pair.name().into()),
        Instruction::Dad(pair) => ("DAD".into(), pair.name().into()),
        Instruction::Inr(operand) => ("INR".into(), operand.name().into()),
        Instruction::Dcr(operand) => ("DCR".into(), operand.name().into()),
        Instruction::Mvi { dst, value } => ("MVI".into(), format!("{}, #${value:02x}", dst.name())),
        Instruction::Rotate(op) => {
            let name = match op {
                RotateOp::Rlc => "RLC",
                RotateOp::Rrc => "RRC",
                RotateOp::Ral => "RAL",
                RotateOp::Rar => "RAR",
            };
            (name.into(), String::new())
        }
        Instruction::Shld(addr) => ("SHLD".into(), format!("${addr:04x}")),
        Instruction::Lhld(addr) => ("LHLD".into(), format!("${addr:04x}")),
        Instruction::Sta(addr) => ("STA".into(), format!("${addr:04x}")),
        Instruction::Lda(addr) => ("LDA".into(), format!("${addr:04x}")),
        Instruction::Daa => ("DAA".into(), String::new()),
        Instruction::Cma => ("CMA".into(), String::new()),
        Instruction::Stc => ("STC".into(), String::new()),
        Instruction::Cmc => ("CMC".into(), String::new()),
        Instruction::Mov { dst, src } => ("MOV".into(), format!("{}, {}", dst.name(), src.name())),
        Instruction::Hlt => ("HLT".into(), String::new()),
        Instruction::Alu { op, src } => (op.mnemonic().into(), src.name().into()),
        Instruction::AluImmediate { op, value } => {
            (op.immediate_mnemonic().into(), format!("#${value:02x}"))
        }
        Instruction::Ret => ("RET".into(), String::new()),
        Instruction::RetIf(condition) => (format!("R{}", condition.suffix()), String::new()),
        Instruction::Pop(pair) => ("POP".into(), pair.name().into()),
        Instruction::Push(pair) => ("PUSH".into(), pair.name().into()),
        Instruction::Jmp(target) => ("JMP".into(), format!("${target:04x}")),
        Instruction::JmpIf(condition, target) => {
            (format!("J{}", condition.suffix()), format!("${target:04x}"))
        }
        Instruction::Call(target) => ("CALL".into(), format!("${target:04x}")),
        Instruction::CallIf(condition, target) => {
            (format!("C{}", condition.suffix()), format!("${target:04x}"))
        }
        Instruction::Rst(vector) => ("RST".into(), vector.to_string()),
        Instruction::Out(port) => ("OUT".into(), format!("#${port:02x}")),
        Instruction::In(port) => ("IN".into(), format!("#${port:02x}")),
        Instruction::Xthl => ("XTHL".into(), String::new()),
        Instruction::Pchl => ("PCHL".into(), String::new()),
        Instruction::Xchg => ("XCHG".into(), String::new()),
        Instruction::Sphl => ("SPHL".into(), String::new()),
        Instruction::Di => ("DI".into(), String::new()),
        Instruction::Ei => ("EI".into(), String::new()),
    }
}

const fn pair_name(pair: RegisterPair) -> &'static str {
    match pair {
        RegisterPair::BC => "B",
        RegisterPair::DE => "D",
        RegisterPair::HL => "H",
    }
}

/// Opcodes with no official meaning; the physical part treats them as aliases.
pub const UNDOCUMENTED_OPCODES: [u8; 12] = [
    0x08, 0x10, 0x18, 0x20, 0x28, 0x30, 0x38, 0xCB, 0xD9, 0xDD, 0xED, 0xFD,
];

/// Static per-opcode encoding facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpcodeEncoding {
    /// Total instruction length in bytes, opcode included (`1..=3`).
    pub length: u8,
    /// `false` for the officially-undefined opcodes.
    pub documented: bool,
}

/// Single source-of-truth encoding table indexed by opcode byte.
pub const OPCODE_TABLE: [OpcodeEncoding; 256] = build_table();

#[allow(clippy::cast_possible_truncation)]
const fn build_table() -> [OpcodeEncoding; 256] {
    let mut table = [OpcodeEncoding {
        length: 1,
        documented: true,
    }; 256];
    let mut i = 0;
    while i < 256 {
        let op = i as u8;
        table[i] = OpcodeEncoding {
            length: length_of(op),
            documented: !is_undocumented(op),
        };
        i += 1;
    }
    table
}

const fn length_of(op: u8) -> u8 {
    match op {
        // MVI r,d8 / ALU immediates / IN / OUT
        0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E | 0xC6 | 0xCE | 0xD6 | 0xDE
        | 0xE6 | 0xEE | 0xF6 | 0xFE | 0xD3 | 0xDB => 2,
        // LXI / SHLD / LHLD / STA / LDA
        0x01 | 0x11 | 0x21 | 0x31 | 0x22 | 0x2A | 0x32 | 0x3A => 3,
        // JMP, CALL and their conditional forms
        0xC2 | 0xC3 | 0xC4 | 0xCA | 0xCC | 0xCD | 0xD2 | 0xD4 | 0xDA | 0xDC | 0xE2 | 0xE4
        | 0xEA | 0xEC | 0xF2 | 0xF4 | 0xFA | 0xFC => 3,
        _ => 1,
    }
}

/// Returns true for the twelve officially-undefined opcodes.
#[must_use]
pub const fn is_undocumented(op: u8) -> bool {
    matches!(
        op,
        0x08 | 0x10 | 0x18 | 0x20 | 0x28 | 0x30 | 0x38 | 0xCB | 0xD9 | 0xDD | 0xED | 0xFD
    )
}

/// Returns the encoding facts for an opcode byte.
#[must_use]
pub const fn opcode_encoding(op: u8) -> OpcodeEncoding {
    OPCODE_TABLE[op as usize]
}

/// Returns the total instruction length in bytes for an opcode.
#[must_use]
pub const fn instruction_length(op: u8) -> u8 {
    opcode_encoding(op).length
}

//! ALU / flag unit: pure functions from operands and incoming flags to a
//! result byte and the updated flags.
//!
//! `aux_carry` passes through every operation untouched.

use crate::decoder::{AluOp, Condition, RotateOp};
use crate::state::ConditionFlags;

/// Result byte plus the flags it produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult {
    /// Truncated 8-bit result.
    pub value: u8,
    /// Flags after the operation.
    pub flags: ConditionFlags,
}

/// Even parity by population count.
#[must_use]
pub const fn parity(value: u8) -> bool {
    value.count_ones() % 2 == 0
}

const fn with_szp(mut flags: ConditionFlags, value: u8) -> ConditionFlags {
    flags.zero = value == 0;
    flags.sign = value & 0x80 != 0;
    flags.parity = parity(value);
    flags
}

const fn with_szpc(flags: ConditionFlags, value: u8, carry: bool) -> AluResult {
    let mut flags = with_szp(flags, value);
    flags.carry = carry;
    AluResult { value, flags }
}

/// `a + b + carry_in`; Carry iff the unbounded sum exceeds 255.
#[must_use]
pub fn add(flags: ConditionFlags, a: u8, b: u8, carry_in: bool) -> AluResult {
    let (partial, c1) = a.overflowing_add(b);
    let (value, c2) = partial.overflowing_add(u8::from(carry_in));
    with_szpc(flags, value, c1 || c2)
}

/// `a - b - borrow_in`; Carry iff `a < b + borrow_in`.
#[must_use]
pub fn sub(flags: ConditionFlags, a: u8, b: u8, borrow_in: bool) -> AluResult {
    let (partial, b1) = a.overflowing_sub(b);
    let (value, b2) = partial.overflowing_sub(u8::from(borrow_in));
    with_szpc(flags, value, b1 || b2)
}

/// Applies an accumulator operation. For [`AluOp::Cmp`] the returned value
/// is the difference, which the caller must not write back.
#[must_use]
pub fn accumulate(op: AluOp, flags: ConditionFlags, a: u8, operand: u8) -> AluResult {
    match op {
        AluOp::Add => add(flags, a, operand, false),
        AluOp::Adc => add(flags, a, operand, flags.carry),
        AluOp::Sub | AluOp::Cmp => sub(flags, a, operand, false),
        AluOp::Sbb => sub(flags, a, operand, flags.carry),
        AluOp::Ana => with_szpc(flags, a & operand, false),
        AluOp::Xra => with_szpc(flags, a ^ operand, false),
        AluOp::Ora => with_szpc(flags, a | operand, false),
    }
}

/// `INR`: wrapping increment; Carry untouched.
#[must_use]
pub const fn inr(flags: ConditionFlags, value: u8) -> AluResult {
    let value = value.wrapping_add(1);
    AluResult {
        value,
        flags: with_szp(flags, value),
    }
}

/// `DCR`: wrapping decrement; Carry untouched.
#[must_use]
pub const fn dcr(flags: ConditionFlags, value: u8) -> AluResult {
    let value = value.wrapping_sub(1);
    AluResult {
        value,
        flags: with_szp(flags, value),
    }
}

/// Accumulator rotations; only Carry changes.
#[must_use]
pub fn rotate(op: RotateOp, mut flags: ConditionFlags, a: u8) -> AluResult {
    let carry_in = u8::from(flags.carry);
    let (value, carry) = match op {
        RotateOp::Rlc => (a.rotate_left(1), a & 0x80 != 0),
        RotateOp::Rrc => (a.rotate_right(1), a & 0x01 != 0),
        RotateOp::Ral => ((a << 1) | carry_in, a & 0x80 != 0),
        RotateOp::Rar => ((a >> 1) | (carry_in << 7), a & 0x01 != 0),
    };
    flags.carry = carry;
    AluResult { value, flags }
}

/// `DAD`: 16-bit add; only Carry changes.
#[must_use]
pub const fn dad(mut flags: ConditionFlags, hl: u16, operand: u16) -> (u16, ConditionFlags) {
    let (value, carry) = hl.overflowing_add(operand);
    flags.carry = carry;
    (value, flags)
}

/// Evaluates a branch condition against the current flags.
#[must_use]
pub const fn condition_holds(condition: Condition, flags: ConditionFlags) -> bool {
    match condition {
        Condition::NotZero => !flags.zero,
        Condition::Zero => flags.zero,
        Condition::NoCarry => !flags.carry,
        Condition::Carry => flags.carry,
        Condition::ParityOdd => !flags.parity,
        Condition::ParityEven => flags.parity,
        Condition::Plus => !flags.sign,
        Condition::Minus => flags.sign,
    }
}

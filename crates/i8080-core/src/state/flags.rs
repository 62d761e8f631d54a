//! Condition flags and processor-status-word packing.

/// PSW bit for carry.
pub const PSW_CARRY: u8 = 1 << 0;
/// PSW bit that is always set on the physical part.
pub const PSW_ALWAYS_SET: u8 = 1 << 1;
/// PSW bit for parity.
pub const PSW_PARITY: u8 = 1 << 2;
/// PSW bit for auxiliary carry.
pub const PSW_AUX_CARRY: u8 = 1 << 4;
/// PSW bit for zero.
pub const PSW_ZERO: u8 = 1 << 6;
/// PSW bit for sign.
pub const PSW_SIGN: u8 = 1 << 7;

/// The five 8080 condition flags as explicit named booleans.
///
/// `aux_carry` is carried only so `PUSH PSW`/`POP PSW` round-trip; no
/// instruction in this core computes or consults it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(clippy::struct_excessive_bools)]
pub struct ConditionFlags {
    /// Result was zero.
    pub zero: bool,
    /// Bit 7 of the result was set.
    pub sign: bool,
    /// Result had an even number of set bits.
    pub parity: bool,
    /// Carry out of (or borrow into) bit 7.
    pub carry: bool,
    /// Carry out of bit 3. Tracked, never computed.
    pub aux_carry: bool,
}

impl ConditionFlags {
    /// Packs the flags into the one-byte processor status word.
    #[must_use]
    pub const fn to_psw(self) -> u8 {
        let mut psw = PSW_ALWAYS_SET;
        if self.carry {
            psw |= PSW_CARRY;
        }
        if self.parity {
            psw |= PSW_PARITY;
        }
        if self.aux_carry {
            psw |= PSW_AUX_CARRY;
        }
        if self.zero {
            psw |= PSW_ZERO;
        }
        if self.sign {
            psw |= PSW_SIGN;
        }
        psw
    }

    /// Unpacks a processor status word. Reserved bits are ignored.
    #[must_use]
    pub const fn from_psw(psw: u8) -> Self {
        Self {
            zero: psw & PSW_ZERO != 0,
            sign: psw & PSW_SIGN != 0,
            parity: psw & PSW_PARITY != 0,
            carry: psw & PSW_CARRY != 0,
            aux_carry: psw & PSW_AUX_CARRY != 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConditionFlags, PSW_ALWAYS_SET};

    #[test]
    fn cleared_flags_pack_to_always_set_bit_only() {
        assert_eq!(ConditionFlags::default().to_psw(), PSW_ALWAYS_SET);
    }

    #[test]
    fn every_flag_lands_on_its_physical_bit() {
        let all = ConditionFlags {
            zero: true,
            sign: true,
            parity: true,
            carry: true,
            aux_carry: true,
        };
        assert_eq!(all.to_psw(), 0b1101_0111);
    }

    #[test]
    fn unpack_ignores_reserved_bits() {
        assert_eq!(ConditionFlags::from_psw(0b0010_1010), ConditionFlags::default());
    }

    #[test]
    fn pack_unpack_is_lossless_for_all_combinations() {
        for bits in 0_u8..32 {
            let flags = ConditionFlags {
                zero: bits & 1 != 0,
                sign: bits & 2 != 0,
                parity: bits & 4 != 0,
                carry: bits & 8 != 0,
                aux_carry: bits & 16 != 0,
            };
            assert_eq!(ConditionFlags::from_psw(flags.to_psw()), flags);
        }
    }
}

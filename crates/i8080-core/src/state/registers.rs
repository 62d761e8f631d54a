use super::flags::ConditionFlags;

/// Number of 8-bit general registers (`A B C D E H L`).
pub const REGISTER_COUNT: usize = 7;

/// 8-bit register identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Reg8 {
    B = 0,
    C = 1,
    D = 2,
    E = 3,
    H = 4,
    L = 5,
    A = 6,
}

impl Reg8 {
    /// All registers in storage order.
    pub const ALL: [Self; REGISTER_COUNT] = [
        Self::B,
        Self::C,
        Self::D,
        Self::E,
        Self::H,
        Self::L,
        Self::A,
    ];

    /// Returns the storage index for this register.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Assembly name of the register.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
            Self::H => "H",
            Self::L => "L",
            Self::A => "A",
        }
    }
}

/// 16-bit register pair view over two 8-bit registers, high register first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterPair {
    /// `B:C`.
    BC,
    /// `D:E`.
    DE,
    /// `H:L`.
    HL,
}

impl RegisterPair {
    /// High and low registers backing this pair.
    #[must_use]
    pub const fn halves(self) -> (Reg8, Reg8) {
        match self {
            Self::BC => (Reg8::B, Reg8::C),
            Self::DE => (Reg8::D, Reg8::E),
            Self::HL => (Reg8::H, Reg8::L),
        }
    }
}

/// Architectural register file for the 8080.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterFile {
    regs: [u8; REGISTER_COUNT],
    sp: u16,
    pc: u16,
    flags: ConditionFlags,
    interrupt_enable: bool,
}

impl RegisterFile {
    /// Reads an 8-bit register.
    #[must_use]
    pub const fn reg(&self, reg: Reg8) -> u8 {
        self.regs[reg.index()]
    }

    /// Writes an 8-bit register.
    pub const fn set_reg(&mut self, reg: Reg8, value: u8) {
        self.regs[reg.index()] = value;
    }

    /// Reads the accumulator.
    #[must_use]
    pub const fn a(&self) -> u8 {
        self.reg(Reg8::A)
    }

    /// Writes the accumulator.
    pub const fn set_a(&mut self, value: u8) {
        self.set_reg(Reg8::A, value);
    }

    /// Reads a register pair as `high << 8 | low`.
    #[must_use]
    pub const fn pair(&self, pair: RegisterPair) -> u16 {
        let (hi, lo) = pair.halves();
        u16::from_be_bytes([self.reg(hi), self.reg(lo)])
    }

    /// Writes a register pair, splitting it into its two halves.
    pub const fn set_pair(&mut self, pair: RegisterPair, value: u16) {
        let (hi, lo) = pair.halves();
        let [high, low] = value.to_be_bytes();
        self.set_reg(hi, high);
        self.set_reg(lo, low);
    }

    /// Reads the `PC` register.
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.pc
    }

    /// Writes the `PC` register.
    pub const fn set_pc(&mut self, value: u16) {
        self.pc = value;
    }

    /// Reads the `SP` register.
    #[must_use]
    pub const fn sp(&self) -> u16 {
        self.sp
    }

    /// Writes the `SP` register.
    pub const fn set_sp(&mut self, value: u16) {
        self.sp = value;
    }

    /// Reads the condition flags.
    #[must_use]
    pub const fn flags(&self) -> ConditionFlags {
        self.flags
    }

    /// Mutable access to the condition flags.
    pub const fn flags_mut(&mut self) -> &mut ConditionFlags {
        &mut self.flags
    }

    /// Replaces all condition flags.
    pub const fn set_flags(&mut self, flags: ConditionFlags) {
        self.flags = flags;
    }

    /// Returns the `InterruptEnable` latch.
    #[must_use]
    pub const fn interrupt_enable(&self) -> bool {
        self.interrupt_enable
    }

    /// Sets or clears the `InterruptEnable` latch.
    pub const fn set_interrupt_enable(&mut self, enabled: bool) {
        self.interrupt_enable = enabled;
    }
}

use thiserror::Error;

/// Fault classes used for host policy decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultClass {
    /// Opcode has no executable action in the active profile.
    Decode,
    /// Memory or stack access fell outside the configured store.
    Memory,
    /// Host I/O capability reported a failure.
    Io,
}

/// Direction of a port transfer, used to qualify I/O faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum PortDirection {
    /// `IN` transfer from a device into the accumulator.
    Input,
    /// `OUT` transfer from the accumulator to a device.
    Output,
}

/// Fault taxonomy returned from the step that discovered the condition.
///
/// A faulting step never leaves partial register, run-state, or memory side
/// effects behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Fault {
    /// Opcode value has no defined action.
    #[error("unimplemented opcode 0x{opcode:02X} at 0x{address:04X}")]
    UnimplementedOpcode {
        /// Raw opcode byte.
        opcode: u8,
        /// Address the opcode was fetched from.
        address: u16,
    },
    /// Memory or stack access beyond the configured store.
    #[error("memory access out of bounds at 0x{address:04X}")]
    OutOfBoundsAccess {
        /// Offending address.
        address: u16,
    },
    /// Host I/O capability could not complete a port transfer.
    #[error("i/o port 0x{port:02X} failed ({direction:?})")]
    IoPortFailure {
        /// Port number addressed by `IN`/`OUT`.
        port: u8,
        /// Transfer direction.
        direction: PortDirection,
    },
}

impl Fault {
    /// Stable one-byte code for logs and host-side tables.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::UnimplementedOpcode { .. } => 0x01,
            Self::OutOfBoundsAccess { .. } => 0x02,
            Self::IoPortFailure { .. } => 0x03,
        }
    }

    /// Returns the fault class for this fault.
    #[must_use]
    pub const fn class(self) -> FaultClass {
        match self {
            Self::UnimplementedOpcode { .. } => FaultClass::Decode,
            Self::OutOfBoundsAccess { .. } => FaultClass::Memory,
            Self::IoPortFailure { .. } => FaultClass::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Fault, FaultClass, PortDirection};

    #[test]
    fn codes_are_distinct() {
        let faults = [
            Fault::UnimplementedOpcode {
                opcode: 0x27,
                address: 0,
            },
            Fault::OutOfBoundsAccess { address: 0x8000 },
            Fault::IoPortFailure {
                port: 1,
                direction: PortDirection::Input,
            },
        ];
        for (i, a) in faults.iter().enumerate() {
            for b in &faults[i + 1..] {
                assert_ne!(a.code(), b.code());
            }
        }
    }

    #[test]
    fn class_mapping_matches_taxonomy() {
        assert_eq!(
            Fault::UnimplementedOpcode {
                opcode: 0x27,
                address: 0x0100
            }
            .class(),
            FaultClass::Decode
        );
        assert_eq!(
            Fault::OutOfBoundsAccess { address: 0xFFFF }.class(),
            FaultClass::Memory
        );
        assert_eq!(
            Fault::IoPortFailure {
                port: 0x10,
                direction: PortDirection::Output
            }
            .class(),
            FaultClass::Io
        );
    }

    #[test]
    fn display_includes_opcode_and_address() {
        let fault = Fault::UnimplementedOpcode {
            opcode: 0x27,
            address: 0x0104,
        };
        assert_eq!(fault.to_string(), "unimplemented opcode 0x27 at 0x0104");
    }
}

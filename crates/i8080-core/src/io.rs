//! Pluggable I/O port capability used by `IN` and `OUT`.

/// Port transfer failure categories reported by a host adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoError {
    /// Adapter could not complete an `IN` transfer.
    ReadFailed,
    /// Adapter could not complete an `OUT` transfer.
    WriteFailed,
}

/// Host-supplied device bus for the 256 I/O ports.
///
/// The engine performs no device behavior itself; `IN` and `OUT` are routed
/// here verbatim.
pub trait IoBus {
    /// Reads one byte from `port`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::ReadFailed`] when the adapter cannot complete the
    /// read.
    fn port_in(&mut self, port: u8) -> Result<u8, IoError>;

    /// Writes one byte to `port`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFailed`] when the adapter cannot complete the
    /// write.
    fn port_out(&mut self, port: u8, value: u8) -> Result<(), IoError>;
}

/// Bus with nothing attached: reads float high, writes are discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullIo;

impl IoBus for NullIo {
    fn port_in(&mut self, _port: u8) -> Result<u8, IoError> {
        Ok(0xFF)
    }

    fn port_out(&mut self, _port: u8, _value: u8) -> Result<(), IoError> {
        Ok(())
    }
}

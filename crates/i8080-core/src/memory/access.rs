//! Bounds-checked memory port accessors.

use super::ADDRESS_SPACE_BYTES;
use crate::Fault;

/// Byte-addressable store the engine reads and writes through.
///
/// The store is allocated and owned by the host. Any address at or beyond
/// [`MemoryPort::size`] is reported as [`Fault::OutOfBoundsAccess`].
///
/// The engine checks every staged write against `size()` before committing
/// any of them, so `write_byte` must succeed for every address below
/// `size()`. An implementation that rejects an in-range address can leave a
/// multi-byte store (`PUSH`, `CALL`, `SHLD`) partially applied.
pub trait MemoryPort {
    /// Number of addressable bytes in the store.
    fn size(&self) -> usize;

    /// Reads one byte.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::OutOfBoundsAccess`] when `addr` is outside the store.
    fn read_byte(&self, addr: u16) -> Result<u8, Fault>;

    /// Writes one byte. Must not fail for any `addr` below `size()`.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::OutOfBoundsAccess`] when `addr` is outside the store.
    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), Fault>;
}

impl MemoryPort for [u8] {
    fn size(&self) -> usize {
        self.len()
    }

    fn read_byte(&self, addr: u16) -> Result<u8, Fault> {
        self.get(usize::from(addr))
            .copied()
            .ok_or(Fault::OutOfBoundsAccess { address: addr })
    }

    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), Fault> {
        let slot = self
            .get_mut(usize::from(addr))
            .ok_or(Fault::OutOfBoundsAccess { address: addr })?;
        *slot = value;
        Ok(())
    }
}

impl MemoryPort for Vec<u8> {
    fn size(&self) -> usize {
        self.as_slice().size()
    }

    fn read_byte(&self, addr: u16) -> Result<u8, Fault> {
        self.as_slice().read_byte(addr)
    }

    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), Fault> {
        self.as_mut_slice().write_byte(addr, value)
    }
}

impl MemoryPort for Box<[u8]> {
    fn size(&self) -> usize {
        (**self).size()
    }

    fn read_byte(&self, addr: u16) -> Result<u8, Fault> {
        (**self).read_byte(addr)
    }

    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), Fault> {
        (**self).write_byte(addr, value)
    }
}

/// Checks that `addr` is inside the store without touching it.
///
/// # Errors
///
/// Returns [`Fault::OutOfBoundsAccess`] when `addr` is outside the store.
pub fn validate_access<M: MemoryPort + ?Sized>(memory: &M, addr: u16) -> Result<(), Fault> {
    if usize::from(addr) < memory.size() {
        Ok(())
    } else {
        Err(Fault::OutOfBoundsAccess { address: addr })
    }
}

/// Reads a little-endian 16-bit value (low byte at `addr`, address wraps).
///
/// # Errors
///
/// Returns [`Fault::OutOfBoundsAccess`] for the first byte outside the store.
pub fn read_u16_le<M: MemoryPort + ?Sized>(memory: &M, addr: u16) -> Result<u16, Fault> {
    let lo = memory.read_byte(addr)?;
    let hi = memory.read_byte(addr.wrapping_add(1))?;
    Ok(u16::from_le_bytes([lo, hi]))
}

/// Copies a program image into the store starting at `origin`.
///
/// Nothing is written unless the whole image fits.
///
/// # Errors
///
/// Returns [`Fault::OutOfBoundsAccess`] naming the first address that does
/// not fit.
pub fn load_image<M: MemoryPort + ?Sized>(
    memory: &mut M,
    origin: u16,
    image: &[u8],
) -> Result<(), Fault> {
    let limit = memory.size().min(ADDRESS_SPACE_BYTES);
    let end = usize::from(origin) + image.len();
    if end > limit {
        let first_bad = limit.max(usize::from(origin));
        return Err(Fault::OutOfBoundsAccess {
            address: u16::try_from(first_bad).unwrap_or(u16::MAX),
        });
    }

    for (offset, byte) in image.iter().copied().enumerate() {
        let addr = u16::try_from(usize::from(origin) + offset)
            .map_err(|_| Fault::OutOfBoundsAccess { address: u16::MAX })?;
        memory.write_byte(addr, byte)?;
    }
    Ok(())
}

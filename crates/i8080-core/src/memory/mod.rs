//! Memory port contract and host-side address-space helpers.

/// Bounds-checked accessors and validation helpers.
pub mod access;

pub use access::{load_image, read_u16_le, validate_access, MemoryPort};

/// Size in bytes of the full 8080 address space (64 KiB).
pub const ADDRESS_SPACE_BYTES: usize = u16::MAX as usize + 1;

/// Allocates a zeroed 64 KiB address-space backing store for a host.
///
/// The engine never calls this itself; memory is always owned by the host.
#[must_use]
pub fn new_address_space() -> Box<[u8]> {
    vec![0; ADDRESS_SPACE_BYTES].into_boxed_slice()
}

//! File-level disassembly for Intel 8080 binary images.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use i8080_core::{disassemble_all, DisassemblyRow, ADDRESS_SPACE_BYTES};

/// Errors raised while loading an image for disassembly.
#[derive(Debug, thiserror::Error)]
pub enum DisasmError {
    /// The image file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    InputFile {
        /// Path that failed to load.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The image file holds no bytes.
    #[error("{} is empty", path.display())]
    EmptyImage {
        /// Path of the empty file.
        path: PathBuf,
    },
    /// The image does not fit in the address space above `origin`.
    #[error("image of {len} bytes does not fit at origin ${origin:04x}")]
    ImageTooLarge {
        /// Image length in bytes.
        len: usize,
        /// Requested load address.
        origin: u16,
    },
    /// The origin argument is not a valid 16-bit hexadecimal address.
    #[error("invalid origin: {0}")]
    InvalidOrigin(String),
}

/// Parses a load address written as hexadecimal, with an optional `0x` or
/// `$` prefix.
///
/// # Errors
///
/// Returns [`DisasmError::InvalidOrigin`] when the text is not a 16-bit hex
/// number.
pub fn parse_origin(text: &str) -> Result<u16, DisasmError> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .or_else(|| text.strip_prefix('$'))
        .unwrap_or(text);

    u16::from_str_radix(digits, 16).map_err(|_| DisasmError::InvalidOrigin(text.to_owned()))
}

/// Reads a binary image from disk.
///
/// # Errors
///
/// Fails when the file cannot be read or is empty.
pub fn read_image(path: &Path) -> Result<Vec<u8>, DisasmError> {
    let bytes = fs::read(path).map_err(|source| DisasmError::InputFile {
        path: path.to_path_buf(),
        source,
    })?;

    if bytes.is_empty() {
        return Err(DisasmError::EmptyImage {
            path: path.to_path_buf(),
        });
    }
    Ok(bytes)
}

/// Disassembles `bytes` as if loaded at `origin`.
///
/// # Errors
///
/// Returns [`DisasmError::ImageTooLarge`] when the image would run past the
/// top of the 64 KiB address space.
pub fn disassemble_image(bytes: &[u8], origin: u16) -> Result<Vec<DisassemblyRow>, DisasmError> {
    if usize::from(origin) + bytes.len() > ADDRESS_SPACE_BYTES {
        return Err(DisasmError::ImageTooLarge {
            len: bytes.len(),
            origin,
        });
    }
    Ok(disassemble_all(bytes, origin))
}

/// Loads and disassembles the image at `path`.
///
/// # Errors
///
/// Propagates [`read_image`] and [`disassemble_image`] failures.
pub fn disassemble_file(path: &Path, origin: u16) -> Result<Vec<DisassemblyRow>, DisasmError> {
    let bytes = read_image(path)?;
    disassemble_image(&bytes, origin)
}

/// Renders rows one per line, each terminated by a newline.
#[must_use]
pub fn render_listing(rows: &[DisassemblyRow]) -> String {
    let mut out = String::new();
    for row in rows {
        let _ = writeln!(out, "{row}");
    }
    out
}

//! Program Loader.
//!
//! This module reads program images from disk. It accepts:
//! 1. **Raw binaries:** Flat little-endian instruction words, as produced by `objcopy -O binary`.
//! 2. **Hex listings:** Files ending in `.hex` holding one 32-bit word per line,
//!    with optional `0x` prefixes and `#` comments.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::common::constants::INSTRUCTION_BYTES;

/// Failure to load a program image.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("could not read '{}': {source}", path.display())]
    Io {
        /// Path that was opened.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The image contains no instructions.
    #[error("program image is empty")]
    Empty,

    /// The image length is not a whole number of instruction words.
    #[error("program image is {len} bytes, not a multiple of 4")]
    Misaligned {
        /// Image length in bytes.
        len: usize,
    },

    /// A hex listing line is not a 32-bit hexadecimal word.
    #[error("line {line}: expected a 32-bit hex word")]
    BadHex {
        /// One-based line number.
        line: usize,
    },
}

/// Loads a program image from disk.
///
/// # Arguments
///
/// * `path` - Path to a raw binary, or to a `.hex` word listing.
///
/// # Returns
///
/// The image as little-endian bytes, ready to copy into memory.
///
/// # Errors
///
/// Returns [`LoadError`] if the file cannot be read or is not a whole number
/// of instruction words.
pub fn load_binary(path: impl AsRef<Path>) -> Result<Vec<u8>, LoadError> {
    let path = path.as_ref();
    let io_err = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };

    let bytes = if path.extension().is_some_and(|ext| ext == "hex") {
        parse_hex(&fs::read_to_string(path).map_err(io_err)?)?
    } else {
        fs::read(path).map_err(io_err)?
    };

    if bytes.is_empty() {
        return Err(LoadError::Empty);
    }
    if bytes.len() % INSTRUCTION_BYTES as usize != 0 {
        return Err(LoadError::Misaligned { len: bytes.len() });
    }
    debug!("loaded {} bytes from {}", bytes.len(), path.display());
    Ok(bytes)
}

/// Parses a hex word listing into little-endian bytes.
///
/// # Errors
///
/// Returns [`LoadError::BadHex`] for the first line that is not a word.
pub fn parse_hex(text: &str) -> Result<Vec<u8>, LoadError> {
    let mut bytes = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let digits = line
            .strip_prefix("0x")
            .or_else(|| line.strip_prefix("0X"))
            .unwrap_or(line)
            .replace('_', "");
        let word = u32::from_str_radix(&digits, 16).map_err(|_| LoadError::BadHex { line: idx + 1 })?;
        bytes.extend_from_slice(&word.to_le_bytes());
    }
    Ok(bytes)
}

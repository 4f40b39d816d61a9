//! Physical System Memory.
//!
//! This module implements the default memory subsystem. It provides:
//! 1. **Buffer:** A zero-initialised byte store (`RamBuffer`).
//! 2. **Memory:** `FlatMemory`, which maps the buffer at a base address and
//!    implements [`MemoryPort`].

/// Byte storage backing the RAM.
pub mod buffer;

use self::buffer::RamBuffer;
use crate::soc::traits::{MemoryError, MemoryPort};

/// Flat little-endian RAM mapped at `base`.
#[derive(Clone, Debug)]
pub struct FlatMemory {
    buffer: RamBuffer,
    base: u32,
}

impl FlatMemory {
    /// Creates a zeroed memory of `size` bytes starting at `base`.
    pub fn new(base: u32, size: usize) -> Self {
        Self {
            buffer: RamBuffer::new(size),
            base,
        }
    }

    /// Returns the base address.
    pub const fn base(&self) -> u32 {
        self.base
    }

    /// Returns the size in bytes.
    pub const fn size(&self) -> usize {
        self.buffer.len()
    }

    /// Translates an address range to a buffer offset.
    fn offset(&self, addr: u32, len: usize) -> Result<usize, MemoryError> {
        let offset = addr.checked_sub(self.base).ok_or(MemoryError { addr })? as usize;
        if offset.checked_add(len).is_some_and(|end| end <= self.buffer.len()) {
            Ok(offset)
        } else {
            Err(MemoryError { addr })
        }
    }

    /// Copies `data` into memory starting at `addr`.
    ///
    /// Used for loading program images.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError`] if any byte falls outside memory.
    pub fn load(&mut self, addr: u32, data: &[u8]) -> Result<(), MemoryError> {
        let offset = self.offset(addr, data.len())?;
        self.buffer.write_slice(offset, data);
        Ok(())
    }

    /// Reads `len` bytes starting at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError`] if any byte falls outside memory.
    pub fn read_bytes(&self, addr: u32, len: usize) -> Result<&[u8], MemoryError> {
        let offset = self.offset(addr, len)?;
        Ok(self.buffer.read_slice(offset, len))
    }
}

impl MemoryPort for FlatMemory {
    fn read_word(&mut self, addr: u32) -> Result<u32, MemoryError> {
        let offset = self.offset(addr, 4)?;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(self.buffer.read_slice(offset, 4));
        Ok(u32::from_le_bytes(bytes))
    }

    fn write_word(&mut self, addr: u32, data: u32, byte_enable: u8) -> Result<(), MemoryError> {
        let offset = self.offset(addr, 4)?;
        for (lane, byte) in data.to_le_bytes().into_iter().enumerate() {
            if byte_enable & (1 << lane) != 0 {
                self.buffer.write_u8(offset + lane, byte);
            }
        }
        Ok(())
    }
}

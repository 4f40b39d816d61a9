//! Memory port interface.
//!
//! This module defines the contract between the pipeline and the memory
//! subsystem. It provides:
//! 1. **Word Access:** Reads and writes of naturally aligned 32-bit words.
//! 2. **Byte Enables:** Sub-word stores select lanes with a 4-bit mask.
//! 3. **Speculative Fetch:** Instruction fetch never faults; unmapped words read as zero.

use thiserror::Error;

/// An access addressed memory outside the backing store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("address {addr:#010x} is outside memory")]
pub struct MemoryError {
    /// Faulting byte address.
    pub addr: u32,
}

/// Word-addressed memory with per-byte write enables.
///
/// Addresses passed to `read_word` and `write_word` are word aligned.
pub trait MemoryPort {
    /// Reads the 32-bit little-endian word at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError`] if the word is not backed by memory.
    fn read_word(&mut self, addr: u32) -> Result<u32, MemoryError>;

    /// Writes the lanes of `data` selected by `byte_enable` to the word at `addr`.
    ///
    /// # Arguments
    ///
    /// * `addr` - Word-aligned address.
    /// * `data` - Lane-aligned data.
    /// * `byte_enable` - Bit `i` enables byte lane `i`.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError`] if the word is not backed by memory.
    fn write_word(&mut self, addr: u32, data: u32, byte_enable: u8) -> Result<(), MemoryError>;

    /// Fetches an instruction word for Fetch's speculative path.
    ///
    /// Unmapped addresses read as zero, which decodes as a no-op; only
    /// committed-path accesses are allowed to fault.
    fn fetch_word(&mut self, addr: u32) -> u32 {
        self.read_word(addr).unwrap_or(0)
    }
}

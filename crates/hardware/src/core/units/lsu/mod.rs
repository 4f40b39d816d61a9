//! Load/Store Unit (LSU).
//!
//! The memory port is word-addressed with per-byte write enables. This module
//! maps sub-word accesses onto that interface:
//! - [`lanes`]: Byte-lane selection, store-data placement, and load extraction.

/// Byte-lane arithmetic for sub-word accesses.
pub mod lanes;

use crate::core::pipeline::signals::{AccessSize, MemOp};

/// Load/Store Unit helpers shared by Execute and Memory.
#[derive(Debug)]
pub struct Lsu;

impl Lsu {
    /// Prepares a store or load for the memory port.
    ///
    /// # Arguments
    ///
    /// * `addr` - Effective byte address.
    /// * `size` - Access width.
    /// * `data` - Register value to store (ignored for loads).
    ///
    /// # Returns
    ///
    /// `(byte_enable, lane_data)`: the lanes touched within the aligned word
    /// and `data` shifted into those lanes.
    pub const fn place(addr: u32, size: AccessSize, data: u32) -> (u8, u32) {
        let offset = lanes::lane_offset(addr, size);
        (lanes::byte_enable(offset, size), lanes::align_store(data, offset))
    }

    /// Extracts the loaded value from a raw memory word.
    ///
    /// # Arguments
    ///
    /// * `word` - The aligned word read from memory.
    /// * `addr` - Effective byte address.
    /// * `size` - Access width.
    /// * `op`   - Load flavour; `LoadUnsigned` zero-extends.
    pub const fn extract(word: u32, addr: u32, size: AccessSize, op: MemOp) -> u32 {
        let offset = lanes::lane_offset(addr, size);
        lanes::extract_load(word, offset, size, matches!(op, MemOp::Load))
    }
}

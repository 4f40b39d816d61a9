//! Byte-lane arithmetic.
//!
//! Accesses are naturally aligned: the low address bits below the access
//! size are ignored, so a half-word access never straddles two words.

use crate::core::pipeline::signals::AccessSize;

/// Returns the word-aligned address containing `addr`.
pub const fn word_address(addr: u32) -> u32 {
    addr & !3
}

/// Returns the byte offset of the access within its word, aligned to `size`.
pub const fn lane_offset(addr: u32, size: AccessSize) -> u32 {
    match size {
        AccessSize::Byte => addr & 3,
        AccessSize::Half => addr & 2,
        AccessSize::Word => 0,
    }
}

/// Returns `true` if `addr` is not naturally aligned for `size`.
pub const fn is_misaligned(addr: u32, size: AccessSize) -> bool {
    addr & (size.bytes() - 1) != 0
}

/// Returns the 4-bit byte-enable mask for an access.
pub const fn byte_enable(offset: u32, size: AccessSize) -> u8 {
    let lanes: u8 = match size {
        AccessSize::Byte => 0b0001,
        AccessSize::Half => 0b0011,
        AccessSize::Word => 0b1111,
    };
    lanes << offset
}

/// Shifts store data into its lanes.
pub const fn align_store(data: u32, offset: u32) -> u32 {
    data << (offset * 8)
}

/// Pulls a loaded value out of its lanes and extends it to 32 bits.
pub const fn extract_load(word: u32, offset: u32, size: AccessSize, signed: bool) -> u32 {
    let raw = word >> (offset * 8);
    match (size, signed) {
        (AccessSize::Byte, true) => raw as u8 as i8 as i32 as u32,
        (AccessSize::Byte, false) => raw & 0xff,
        (AccessSize::Half, true) => raw as u16 as i16 as i32 as u32,
        (AccessSize::Half, false) => raw & 0xffff,
        (AccessSize::Word, _) => raw,
    }
}

//! RISC-V Base Integer (I) Function Codes (funct7).

/// Standard encoding (ADD, SRL).
pub const DEFAULT: u32 = 0b0000000;

/// Alternate encoding (SUB, SRA).
pub const SUB_SRA: u32 = 0b0100000;

//! RISC-V Base Integer (RV32I) encodings.

/// Function codes (funct3).
pub mod funct3;

/// Function codes (funct7).
pub mod funct7;

/// Major opcodes.
pub mod opcodes;

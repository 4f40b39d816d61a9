//! Instruction encoding and decoding utilities.
//!
//! Provides bit extraction for the fields and immediates of a 32-bit
//! RISC-V instruction encoding.

use crate::common::reg::RegId;

/// Bit mask for extracting the opcode field (bits 0-6).
pub const OPCODE_MASK: u32 = 0x7F;
/// Bit mask for extracting a register field.
pub const REG_MASK: u32 = 0x1F;
/// Bit mask for extracting the funct3 field (bits 12-14).
pub const FUNCT3_MASK: u32 = 0x7;
/// Bit mask for extracting the funct7 field (bits 25-31).
pub const FUNCT7_MASK: u32 = 0x7F;

/// Trait for extracting instruction fields from encoded instructions.
pub trait InstructionBits {
    /// Extracts the opcode field (bits 0-6).
    fn opcode(&self) -> u32;

    /// Extracts the destination register field (bits 7-11).
    fn rd(&self) -> RegId;

    /// Extracts the first source register field (bits 15-19).
    fn rs1(&self) -> RegId;

    /// Extracts the second source register field (bits 20-24).
    fn rs2(&self) -> RegId;

    /// Extracts the funct3 field (bits 12-14).
    fn funct3(&self) -> u32;

    /// Extracts the funct7 field (bits 25-31).
    fn funct7(&self) -> u32;

    /// Sign-extended I-type immediate.
    fn imm_i(&self) -> u32;

    /// Sign-extended S-type immediate.
    fn imm_s(&self) -> u32;

    /// Sign-extended B-type immediate (even byte offset).
    fn imm_b(&self) -> u32;

    /// U-type immediate (upper 20 bits, low 12 clear).
    fn imm_u(&self) -> u32;

    /// Sign-extended J-type immediate (even byte offset).
    fn imm_j(&self) -> u32;
}

impl InstructionBits for u32 {
    #[inline(always)]
    fn opcode(&self) -> u32 {
        self & OPCODE_MASK
    }

    #[inline(always)]
    fn rd(&self) -> RegId {
        RegId::from_field(u64::from((self >> 7) & REG_MASK))
    }

    #[inline(always)]
    fn rs1(&self) -> RegId {
        RegId::from_field(u64::from((self >> 15) & REG_MASK))
    }

    #[inline(always)]
    fn rs2(&self) -> RegId {
        RegId::from_field(u64::from((self >> 20) & REG_MASK))
    }

    #[inline(always)]
    fn funct3(&self) -> u32 {
        (self >> 12) & FUNCT3_MASK
    }

    #[inline(always)]
    fn funct7(&self) -> u32 {
        (self >> 25) & FUNCT7_MASK
    }

    fn imm_i(&self) -> u32 {
        ((*self as i32) >> 20) as u32
    }

    fn imm_s(&self) -> u32 {
        ((((*self & 0xfe00_0000) as i32) >> 20) as u32) | ((self >> 7) & 0x1f)
    }

    fn imm_b(&self) -> u32 {
        let sign = (((*self & 0x8000_0000) as i32) >> 19) as u32;
        sign | ((self & 0x80) << 4) | ((self >> 20) & 0x7e0) | ((self >> 7) & 0x1e)
    }

    fn imm_u(&self) -> u32 {
        self & 0xffff_f000
    }

    fn imm_j(&self) -> u32 {
        let sign = (((*self & 0x8000_0000) as i32) >> 11) as u32;
        sign | (self & 0x000f_f000) | ((self >> 9) & 0x800) | ((self >> 20) & 0x7fe)
    }
}

//! Instruction Set Architecture (ISA) Definitions.
//!
//! The pipeline treats the instruction decoder as an external collaborator
//! behind the [`decode::InstructionDecoder`] trait. This module supplies the
//! default implementation for an RV32I subset.
//!
//! # Extensions
//!
//! * `rv32i`: Base integer opcodes and function codes (loads, stores, branches,
//!   jumps, register and immediate arithmetic, ECALL/EBREAK as halt).

/// Instruction decoding into pipeline control signals.
pub mod decode;

/// Instruction disassembler for trace output.
pub mod disasm;

/// Instruction field and immediate extraction.
pub mod instruction;

/// Base integer instruction set (32-bit).
pub mod rv32i;

pub use decode::{DecodedInstruction, InstructionDecoder, Rv32Decoder};

//! Architectural registers.
//!
//! This module provides the register identifier carried on the buses and the
//! register file owned by the pipeline core. It provides:
//! 1. **Identifiers:** `RegId`, a 5-bit register number where `r0` is the "no write" sentinel.
//! 2. **Storage:** `RegisterFile`, 32 words with `r0` hard-wired to zero.
//! 3. **Observability:** A dump helper for printing register state after a run.

use std::fmt;

use crate::common::constants::{REG_COUNT, REG_ID_WIDTH};

/// Architectural register identifier.
///
/// Always in `0..32`. Register 0 reads as zero and doubles as the "no write"
/// destination, so a packet whose `dest` is `r0` never updates the register file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegId(u8);

impl RegId {
    /// The hard-wired zero register.
    pub const ZERO: Self = Self(0);

    /// Creates a register identifier.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not below 32. Register numbers are produced by
    /// 5-bit field extraction, so an out-of-range value is a construction bug.
    pub const fn new(idx: u8) -> Self {
        assert!((idx as usize) < REG_COUNT, "register index out of range");
        Self(idx)
    }

    /// Creates a register identifier from the low 5 bits of an encoded field.
    pub const fn from_field(bits: u64) -> Self {
        Self((bits & ((1 << REG_ID_WIDTH) - 1)) as u8)
    }

    /// Returns the register number.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the register number as a bus field value.
    pub const fn bits(self) -> u64 {
        self.0 as u64
    }

    /// Returns `true` for `r0`.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for RegId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Architectural register file.
///
/// Written only by Write-Back, at most once per tick. Reads of `r0` return zero
/// and writes to it are discarded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterFile {
    regs: [u32; REG_COUNT],
}

impl RegisterFile {
    /// Creates a register file with every register cleared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a register.
    ///
    /// # Arguments
    ///
    /// * `reg` - Register to read. `r0` always returns 0.
    pub const fn read(&self, reg: RegId) -> u32 {
        if reg.is_zero() { 0 } else { self.regs[reg.index()] }
    }

    /// Writes a register.
    ///
    /// # Arguments
    ///
    /// * `reg` - Register to write. Writes to `r0` are ignored.
    /// * `value` - Value to store.
    pub const fn write(&mut self, reg: RegId, value: u32) {
        if !reg.is_zero() {
            self.regs[reg.index()] = value;
        }
    }

    /// Returns a copy of all 32 registers, `r0` first.
    pub const fn snapshot(&self) -> [u32; REG_COUNT] {
        self.regs
    }

    /// Formats the register file as eight rows of four registers.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for (row, chunk) in self.regs.chunks(4).enumerate() {
            for (col, value) in chunk.iter().enumerate() {
                let idx = row * 4 + col;
                out.push_str(&format!("r{idx:<2} = {value:#010x}  "));
            }
            out.push('\n');
        }
        out
    }
}

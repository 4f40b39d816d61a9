//! Execution units.
//!
//! Combinational helpers invoked by the pipeline stages:
//! 1. **ALU:** 32-bit integer arithmetic, logic, and shifts for Execute.
//! 2. **LSU:** Byte-lane placement and extraction for Execute and Memory.

/// Arithmetic Logic Unit.
pub mod alu;

/// Load/Store Unit.
pub mod lsu;

//! Global Datapath Constants.
//!
//! This module defines the fixed geometry of the pipeline. It includes:
//! 1. **Datapath Constants:** Word width, register identifier width, and instruction size.
//! 2. **Bus Widths:** The declared width, in bits, of every inter-stage bus.
//!
//! The bus widths are part of the external contract and are preserved bit-for-bit.

/// Width of every datapath value in bits.
pub const XLEN: u32 = 32;

/// Width of an architectural register identifier in bits.
pub const REG_ID_WIDTH: u32 = 5;

/// Number of architectural registers.
pub const REG_COUNT: usize = 1 << REG_ID_WIDTH;

/// Size of an instruction in bytes; Fetch speculates `pc + INSTRUCTION_BYTES`.
pub const INSTRUCTION_BYTES: u32 = 4;

/// Width of the access-size tag (byte/half/word) carried from Decode to Memory.
pub const DATA_SIZE_WIDTH: u32 = 2;

/// Fetch → Decode bus: instruction, pc, valid.
pub const IF_TO_ID_BUS_WIDTH: u32 = 65;

/// Decode → Execute bus, including the trailing access-size tag.
pub const ID_TO_EXE_BUS_WIDTH: u32 = 154 + DATA_SIZE_WIDTH;

/// Execute → Memory bus, including the trailing access-size tag.
pub const EXE_TO_MEM_BUS_WIDTH: u32 = 108 + DATA_SIZE_WIDTH;

/// Memory → Write-Back bus.
pub const MEM_TO_WB_BUS_WIDTH: u32 = 70;

/// Execute → Decode forwarding bus.
pub const EXE_TO_ID_BUS_WIDTH: u32 = 40;

/// Memory → Decode forwarding bus.
pub const MEM_TO_ID_BUS_WIDTH: u32 = 40;

/// Write-Back → Decode commit bus.
pub const WB_TO_ID_BUS_WIDTH: u32 = 39;

/// Decode → Fetch redirect bus.
pub const ID_TO_IF_BUS_WIDTH: u32 = 33;

/// Cross-cutting bypass bus read by Decode's operand stage.
pub const BYPASS_BUS_WIDTH: u32 = 38;

/// Maximum number of retired program counters kept for inspection.
pub const COMMIT_TRACE_MAX: usize = 4096;

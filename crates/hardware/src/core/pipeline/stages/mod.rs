//! Pipeline stage implementations.
//!
//! This module contains the combinational logic of the five stages. Each stage
//! function maps its input packet (plus any collaborator it needs) to its output
//! packet; latching, stalling, and flushing are left to the stage controllers.
//! 1. **Fetch:** Reads the instruction at the program counter and speculates fall-through.
//! 2. **Decode:** Decodes the instruction and reads operands through the bypass network.
//! 3. **Execute:** Performs ALU operations and computes addresses and link values.
//! 4. **Memory:** Performs loads and stores on the memory port.
//! 5. **Writeback:** Produces the commit record and retires it into the register file.

/// Instruction decode stage implementation.
pub mod decode;

/// Instruction execute stage implementation.
pub mod execute;

/// Instruction fetch stage implementation.
pub mod fetch;

/// Memory access stage implementation.
pub mod memory;

/// Writeback stage implementation.
pub mod writeback;

/// Decode stage entry point (ID stage).
pub use decode::decode_stage;
/// Execute stage entry point (EX stage).
pub use execute::execute_stage;
/// Fetch stage entry point (IF stage).
pub use fetch::fetch_stage;
/// Memory stage entry point (MEM stage).
pub use memory::mem_stage;
/// Writeback stage entry point (WB stage).
pub use writeback::wb_stage;

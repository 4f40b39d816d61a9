//! Instruction pipeline implementation.
//!
//! This module contains the five-stage pipeline and its control protocol.
//! It includes the following components:
//! 1. **Bus:** Fixed-width bus words and the packet packing contract.
//! 2. **Latches:** The packets carried on each forward, feedback, and bypass bus.
//! 3. **Signals:** Control signals generated during instruction decoding.
//! 4. **Controller:** Per-stage state machine honoring stall and flush.
//! 5. **Bypass:** Priority forwarding of uncommitted results into Decode.
//! 6. **Hazards:** Load-use and interlock stall decisions.
//! 7. **Branch:** Control-transfer resolution and Fetch redirects.
//! 8. **Stages:** Combinational logic of Fetch, Decode, Execute, Memory, and Writeback.
//! 9. **Engine:** The pipeline core that ties them together each tick.

/// Branch resolution unit.
pub mod branch;

/// Bus words, field packing, and the `Packet` trait.
pub mod bus;

/// Bypass network feeding Decode's operand read.
pub mod bypass;

/// Stage controllers and stage states.
pub mod controller;

/// Pipeline core and per-tick reports.
pub mod engine;

/// Pipeline hazard detection.
pub mod hazards;

/// Inter-stage packets (IF/ID, ID/EX, EX/MEM, MEM/WB, feedback, bypass).
pub mod latches;

/// Control signals generated during instruction decode.
pub mod signals;

/// Pipeline stage implementations (fetch, decode, execute, memory, writeback).
pub mod stages;

//! Five-stage pipeline protocol simulator library.
//!
//! This crate models the control and hazard-resolution protocol of a scalar
//! five-stage pipeline at the cycle level:
//! 1. **Buses:** Fixed-width packets between stages, packed bit-for-bit.
//! 2. **Core:** Stage controllers, hazard unit, bypass network, and branch resolution.
//! 3. **ISA:** An RV32I subset decoder and disassembler driving the datapath.
//! 4. **SoC:** A flat little-endian memory behind the `MemoryPort` trait.
//! 5. **Simulation:** Loader, configuration, and statistics collection.

/// Common types and constants (bus widths, registers, errors).
pub mod common;
/// Simulator configuration (defaults, branch placement, hierarchical config structures).
pub mod config;
/// Pipeline core (buses, controllers, hazards, stages, execution units).
pub mod core;
/// Instruction set (decode, instruction fields, RV32I encodings, disassembly).
pub mod isa;
/// Program loader and simulation driver.
pub mod sim;
/// Memory subsystem (flat RAM, memory port trait).
pub mod soc;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// The five-stage pipeline; construct with `PipelineCore::new`.
pub use crate::core::PipelineCore;
/// Top-level driver owning a core and its configuration.
pub use crate::sim::simulator::Simulator;

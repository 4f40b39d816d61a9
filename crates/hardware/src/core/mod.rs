//! Core processor implementation.
//!
//! This module contains the pipeline and the execution units it drives.

/// Instruction pipeline implementation (buses, controllers, hazards, stages).
pub mod pipeline;

/// Execution units (ALU, load/store lane logic).
pub mod units;

pub use self::pipeline::engine::{PipelineCore, TickReport};

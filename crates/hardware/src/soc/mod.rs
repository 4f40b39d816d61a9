//! System-on-Chip (SoC) Components.
//!
//! This module holds the memory side of the simulated system: the word-wide
//! memory port the pipeline talks to and the flat RAM that backs it by default.

/// Flat little-endian RAM.
pub mod memory;

/// Memory port trait and its error type.
pub mod traits;

pub use memory::FlatMemory;
pub use traits::{MemoryError, MemoryPort};

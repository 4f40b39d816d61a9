//! Common types and constants shared by every pipeline component.
//!
//! This module provides the building blocks the rest of the crate leans on:
//! 1. **Constants:** Declared bus widths and datapath geometry.
//! 2. **Error Handling:** The `PipelineError` verification failures.
//! 3. **Register Management:** Register identifiers and the architectural register file.

/// Bus widths and datapath constants.
pub mod constants;

/// Pipeline verification errors.
pub mod error;

/// Register identifiers and register file.
pub mod reg;

pub use error::PipelineError;
pub use reg::{RegId, RegisterFile};

//! Pipeline verification errors.
//!
//! The pipeline protocol has no recoverable runtime errors: every hazard is
//! resolved by stalling, forwarding, or flushing. The variants below report
//! violations of the protocol's invariants, which indicate a defect in a stage
//! or collaborator rather than a condition the program can handle. They are:
//! 1. **Structural:** An operand was consumed before its producer made it available.
//! 2. **Control:** A stage given both stall and flush did not end flushed.
//! 3. **Encoding:** A packet field or bus word exceeded its declared width.
//! 4. **Memory:** A committed-path access addressed memory that does not exist.

use thiserror::Error;

use crate::common::reg::RegId;
use crate::core::pipeline::bus::BusKind;
use crate::core::pipeline::controller::{StageId, StageState};

/// Fatal protocol violation detected while advancing the pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Decode read an operand whose producing instruction had not yet produced it.
    #[error("structural hazard at pc {pc:#010x}: {reg} read before its producer completed")]
    StructuralHazard {
        /// Program counter of the consuming instruction.
        pc: u32,
        /// Register that was read too early.
        reg: RegId,
    },

    /// A stage received both stall and flush but did not latch a bubble.
    #[error("{stage} received stall and flush but ended {state}")]
    FlushStallConflict {
        /// Stage that misbehaved.
        stage: StageId,
        /// State the stage actually reached.
        state: StageState,
    },

    /// A packet field value does not fit in its declared field width.
    #[error("{bus}: field `{field}` value {value:#x} does not fit in {width} bits")]
    FieldOverflow {
        /// Bus whose layout was violated.
        bus: BusKind,
        /// Field name within the layout.
        field: &'static str,
        /// Offending value.
        value: u64,
        /// Declared field width.
        width: u32,
    },

    /// A bus word has bits set beyond the bus's declared width.
    #[error("{bus}: word uses {used} bits but the bus is {width} bits wide")]
    WidthOverflow {
        /// Bus whose width was exceeded.
        bus: BusKind,
        /// Number of bits the word or layout occupies.
        used: u32,
        /// Declared bus width.
        width: u32,
    },

    /// A packed field holds a code that names no known value.
    #[error("{bus}: field `{field}` holds unknown code {value:#x}")]
    InvalidEncoding {
        /// Bus being unpacked.
        bus: BusKind,
        /// Field name within the layout.
        field: &'static str,
        /// Offending code.
        value: u64,
    },

    /// A latched packet changed when packed and unpacked again.
    #[error("{bus}: packet did not survive a pack/unpack round trip")]
    BusMismatch {
        /// Bus whose packet was altered.
        bus: BusKind,
    },

    /// A committed-path load or store addressed memory outside the backing store.
    #[error("memory fault at pc {pc:#010x}: address {addr:#010x} is unmapped")]
    MemoryFault {
        /// Program counter of the faulting instruction.
        pc: u32,
        /// Faulting byte address.
        addr: u32,
    },
}

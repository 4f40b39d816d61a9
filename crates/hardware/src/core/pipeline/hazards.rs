//! Data Hazard Detection.
//!
//! This module decides, once per tick, whether the instruction in Decode may
//! read its operands. It provides:
//! 1. **Load-Use Detection:** With forwarding, a source whose youngest producer is a
//!    load still in Execute stalls Fetch and Decode for one tick; Execute receives a bubble.
//! 2. **Interlock Mode:** With forwarding disabled, any in-flight producer of a source
//!    stalls Decode until the value has been written to the register file.

use crate::common::reg::RegId;
use crate::core::pipeline::bypass::{BypassLookup, BypassNetwork, ForwardOrigin};

/// Why Decode is stalled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HazardCause {
    /// A source is produced by a load whose data is not available yet.
    LoadUse {
        /// Register being waited on.
        reg: RegId,
    },
    /// Forwarding is disabled and a source has an uncommitted producer.
    Interlock {
        /// Register being waited on.
        reg: RegId,
        /// Stage holding the producer.
        origin: ForwardOrigin,
    },
}

/// Stall decision for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HazardDecision {
    /// Reason for stalling; `None` lets Decode proceed.
    pub cause: Option<HazardCause>,
}

impl HazardDecision {
    /// Decode may proceed.
    pub const CLEAR: Self = Self { cause: None };

    /// Returns `true` when Fetch and Decode must hold and Execute receives a bubble.
    pub const fn stall(&self) -> bool {
        self.cause.is_some()
    }
}

/// Decides stalls from Decode's source registers and the bypass network.
#[derive(Clone, Copy, Debug)]
pub struct HazardUnit {
    forwarding: bool,
}

impl HazardUnit {
    /// Creates a hazard unit.
    ///
    /// # Arguments
    ///
    /// * `forwarding` - Whether the bypass network may satisfy operands.
    pub const fn new(forwarding: bool) -> Self {
        Self { forwarding }
    }

    /// Returns `true` when forwarding is enabled.
    pub const fn forwarding(&self) -> bool {
        self.forwarding
    }

    /// Examines every source of the instruction in Decode.
    ///
    /// # Arguments
    ///
    /// * `sources` - Registers the instruction reads; `r0` entries are ignored.
    /// * `bypass` - This tick's bypass network.
    ///
    /// # Returns
    ///
    /// The decision for the first source that cannot be satisfied this tick.
    pub fn detect(&self, sources: &[RegId], bypass: &BypassNetwork) -> HazardDecision {
        let cause = sources.iter().find_map(|&reg| match bypass.lookup(reg) {
            BypassLookup::RegisterFile => None,
            BypassLookup::Pending { origin } if !self.forwarding => {
                Some(HazardCause::Interlock { reg, origin })
            }
            BypassLookup::Pending { .. } => Some(HazardCause::LoadUse { reg }),
            BypassLookup::Forwarded { origin, .. } if !self.forwarding => {
                Some(HazardCause::Interlock { reg, origin })
            }
            BypassLookup::Forwarded { .. } => None,
        });
        HazardDecision { cause }
    }
}

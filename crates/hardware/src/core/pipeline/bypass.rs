//! Bypass network.
//!
//! Routes results that have not yet been written to the register file back to
//! Decode's operand read. Sources are held in a priority-ordered list, youngest
//! producer first (Execute forward, Memory forward, Write-Back commit), and the
//! first source whose destination matches wins. The network is purely
//! combinational: it is rebuilt from the current tick's feedback buses.

use std::fmt;

use crate::common::reg::RegId;
use crate::core::pipeline::latches::{
    BypassSignal, ExecuteToDecodeForward, MemoryToDecodeForward, WriteBackToDecodeCommit,
};

/// Stage a forwarded value comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ForwardOrigin {
    /// Execute's result bus.
    Execute,
    /// Memory's result bus.
    Memory,
    /// Write-Back's commit record.
    WriteBack,
}

impl fmt::Display for ForwardOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Execute => "EX",
            Self::Memory => "MEM",
            Self::WriteBack => "WB",
        };
        f.write_str(name)
    }
}

/// One entry of the bypass priority list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BypassSource {
    /// Producer stage; `None` for an empty slot.
    pub origin: Option<ForwardOrigin>,
    /// The source writes `reg`.
    pub writes: bool,
    /// `value` is not produced yet.
    pub pending: bool,
    /// Destination register.
    pub reg: RegId,
    /// Produced value.
    pub value: u32,
}

impl BypassSource {
    /// Returns `true` when this source is a live producer of `reg`.
    pub const fn matches(&self, reg: RegId) -> bool {
        self.writes && !self.reg.is_zero() && self.reg.index() == reg.index()
    }
}

impl From<&ExecuteToDecodeForward> for BypassSource {
    fn from(fwd: &ExecuteToDecodeForward) -> Self {
        Self {
            origin: Some(ForwardOrigin::Execute),
            writes: fwd.valid && fwd.write_enable,
            pending: fwd.load_pending,
            reg: fwd.dest,
            value: fwd.value,
        }
    }
}

impl From<&MemoryToDecodeForward> for BypassSource {
    fn from(fwd: &MemoryToDecodeForward) -> Self {
        Self {
            origin: Some(ForwardOrigin::Memory),
            writes: fwd.valid && fwd.write_enable,
            pending: fwd.load_pending,
            reg: fwd.dest,
            value: fwd.value,
        }
    }
}

impl From<&WriteBackToDecodeCommit> for BypassSource {
    fn from(commit: &WriteBackToDecodeCommit) -> Self {
        Self {
            origin: Some(ForwardOrigin::WriteBack),
            writes: commit.valid && commit.write_enable,
            pending: false,
            reg: commit.dest,
            value: commit.value,
        }
    }
}

/// Result of looking a register up in the bypass network.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BypassLookup {
    /// No in-flight producer; read the register file.
    RegisterFile,
    /// The youngest producer has the value available.
    Forwarded {
        /// Producer stage.
        origin: ForwardOrigin,
        /// Forwarded value.
        value: u32,
    },
    /// The youngest producer has not produced the value yet.
    Pending {
        /// Producer stage.
        origin: ForwardOrigin,
    },
}

/// Priority-ordered bypass network for one tick.
#[derive(Clone, Debug, Default)]
pub struct BypassNetwork {
    sources: Vec<BypassSource>,
    forwarding: bool,
}

impl BypassNetwork {
    /// Builds a network over `sources`, highest priority first.
    ///
    /// # Arguments
    ///
    /// * `sources` - Producers, youngest first.
    /// * `forwarding` - When `false`, `resolve` never overrides the register
    ///   file, but `lookup` still reports in-flight producers.
    pub fn new(sources: impl IntoIterator<Item = BypassSource>, forwarding: bool) -> Self {
        Self {
            sources: sources.into_iter().collect(),
            forwarding,
        }
    }

    /// Builds the standard three-source network from the feedback buses.
    pub fn from_buses(
        ex: &ExecuteToDecodeForward,
        mem: &MemoryToDecodeForward,
        wb: &WriteBackToDecodeCommit,
        forwarding: bool,
    ) -> Self {
        Self::new([ex.into(), mem.into(), wb.into()], forwarding)
    }

    /// Returns `true` when forwarded values may override the register file.
    pub const fn forwarding(&self) -> bool {
        self.forwarding
    }

    /// Returns the priority list.
    pub fn sources(&self) -> &[BypassSource] {
        &self.sources
    }

    /// Finds the youngest in-flight producer of `reg`. `r0` never matches.
    pub fn lookup(&self, reg: RegId) -> BypassLookup {
        if reg.is_zero() {
            return BypassLookup::RegisterFile;
        }
        self.sources
            .iter()
            .find(|s| s.matches(reg))
            .and_then(|s| s.origin.map(|origin| (origin, s)))
            .map_or(BypassLookup::RegisterFile, |(origin, s)| {
                if s.pending {
                    BypassLookup::Pending { origin }
                } else {
                    BypassLookup::Forwarded {
                        origin,
                        value: s.value,
                    }
                }
            })
    }

    /// Resolves `reg` to a bypass signal.
    ///
    /// # Returns
    ///
    /// The highest-priority available forwarded value, or a signal with
    /// `valid == false` meaning "use the register-file value".
    pub fn resolve(&self, reg: RegId) -> BypassSignal {
        match self.lookup(reg) {
            BypassLookup::Forwarded { value, .. } if self.forwarding => BypassSignal {
                valid: true,
                reg,
                value,
            },
            _ => BypassSignal::register_file(reg),
        }
    }
}

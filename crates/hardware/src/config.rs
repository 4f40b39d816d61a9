//! Configuration system for the pipeline simulator.
//!
//! This module defines the configuration structures used to parameterize a run.
//! It provides:
//! 1. **Defaults:** Baseline constants (reset pc, RAM size, cycle limit).
//! 2. **Structures:** Hierarchical config for general, pipeline, and memory settings.
//! 3. **Enums:** Where control transfers are resolved.
//!
//! Configuration is supplied as JSON (`Config::from_json`) or built with `Config::default()`.

use serde::Deserialize;
use thiserror::Error;

/// Default configuration constants for the simulator.
mod defaults {
    /// Base address of RAM and the default reset pc.
    pub const RAM_BASE: u32 = 0x0000_0000;

    /// Size of RAM in bytes (1 MiB).
    pub const RAM_SIZE: usize = 1024 * 1024;

    /// Cycle limit for a run before giving up on reaching a halt.
    pub const MAX_CYCLES: u64 = 10_000_000;
}

/// Failure to parse a configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid JSON for [`Config`].
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The memory region does not fit in the 32-bit address space.
    #[error("memory region {base:#010x}+{size:#x} exceeds the 32-bit address space")]
    MemoryRange {
        /// Configured base address.
        base: u32,
        /// Configured size in bytes.
        size: usize,
    },
}

/// Stage in which control transfers are resolved.
///
/// Resolving in Decode discards one wrong-path instruction per taken transfer;
/// resolving in Execute discards two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum BranchResolution {
    /// Resolve in Decode using bypassed operands.
    #[default]
    #[serde(alias = "decode")]
    Decode,
    /// Resolve in Execute.
    #[serde(alias = "execute")]
    Execute,
}

/// Root simulator configuration.
///
/// # Examples
///
/// ```
/// use pipesim_core::config::{BranchResolution, Config};
///
/// let json = r#"{
///     "general": { "trace": true, "start_pc": 4096 },
///     "pipeline": { "branch_resolution": "Execute", "forwarding": false },
///     "memory": { "size": 65536, "base": 4096 }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert!(config.general.trace);
/// assert_eq!(config.pipeline.branch_resolution, BranchResolution::Execute);
/// assert!(!config.pipeline.forwarding);
/// assert!(config.pipeline.verify_buses);
/// assert_eq!(config.memory.size, 65536);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General simulation settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// Pipeline hazard handling
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Main memory configuration
    #[serde(default)]
    pub memory: MemoryConfig,
}

impl Config {
    /// Parses a JSON configuration document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the document is malformed or the memory
    /// region overflows the address space.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MemoryRange`] if `base + size` exceeds 2^32.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let end = u64::from(self.memory.base) + self.memory.size as u64;
        if end > 1 << 32 {
            return Err(ConfigError::MemoryRange {
                base: self.memory.base,
                size: self.memory.size,
            });
        }
        Ok(())
    }
}

/// General simulation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Emit per-stage trace events
    #[serde(default)]
    pub trace: bool,

    /// Reset program counter (defaults to RAM base)
    #[serde(default = "GeneralConfig::default_start_pc")]
    pub start_pc: u32,

    /// Give up after this many cycles without a halt
    #[serde(default = "GeneralConfig::default_max_cycles")]
    pub max_cycles: u64,
}

impl GeneralConfig {
    /// Returns the default reset program counter.
    const fn default_start_pc() -> u32 {
        defaults::RAM_BASE
    }

    /// Returns the default cycle limit.
    const fn default_max_cycles() -> u64 {
        defaults::MAX_CYCLES
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            trace: false,
            start_pc: Self::default_start_pc(),
            max_cycles: Self::default_max_cycles(),
        }
    }
}

/// Pipeline hazard-handling configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Stage hosting the branch resolution unit
    #[serde(default)]
    pub branch_resolution: BranchResolution,

    /// Satisfy operands from the bypass network instead of waiting for commit
    #[serde(default = "PipelineConfig::default_forwarding")]
    pub forwarding: bool,

    /// Pack and unpack every latched packet each tick
    #[serde(default = "PipelineConfig::default_verify_buses")]
    pub verify_buses: bool,
}

impl PipelineConfig {
    /// Forwarding is on unless disabled.
    const fn default_forwarding() -> bool {
        true
    }

    /// Bus verification is on unless disabled.
    const fn default_verify_buses() -> bool {
        true
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            branch_resolution: BranchResolution::default(),
            forwarding: Self::default_forwarding(),
            verify_buses: Self::default_verify_buses(),
        }
    }
}

/// Main memory configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// RAM size in bytes
    #[serde(default = "MemoryConfig::default_size")]
    pub size: usize,

    /// Address of the first RAM byte
    #[serde(default = "MemoryConfig::default_base")]
    pub base: u32,
}

impl MemoryConfig {
    /// Returns the default RAM size.
    const fn default_size() -> usize {
        defaults::RAM_SIZE
    }

    /// Returns the default RAM base.
    const fn default_base() -> u32 {
        defaults::RAM_BASE
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            size: Self::default_size(),
            base: Self::default_base(),
        }
    }
}

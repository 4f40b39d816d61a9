//! Simulator: owns a pipeline core and the configuration it was built from.
//!
//! The simulator builds the memory image, places the program at the start pc,
//! and drives the core tick by tick until it halts or a cycle limit is hit.

use thiserror::Error;
use tracing::{debug, info};

use crate::common::error::PipelineError;
use crate::config::{Config, ConfigError};
use crate::core::pipeline::engine::{PipelineCore, TickReport};
use crate::soc::memory::FlatMemory;
use crate::soc::traits::MemoryError;

/// Failure to set up a simulation.
#[derive(Debug, Error)]
pub enum SimError {
    /// The configuration is inconsistent.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The program does not fit in the configured memory.
    #[error("program of {len} bytes does not fit in memory at {addr:#010x}")]
    ProgramTooLarge {
        /// Program length in bytes.
        len: usize,
        /// Load address (the start pc).
        addr: u32,
    },
}

/// How a bounded run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The program decoded a halt and the pipeline drained.
    Halted {
        /// Cycles simulated.
        cycles: u64,
    },
    /// The cycle limit was reached first.
    CycleLimit {
        /// Cycles simulated.
        cycles: u64,
    },
}

/// Top-level simulator: pipeline core plus configuration.
#[derive(Debug)]
pub struct Simulator {
    /// The pipeline, including registers, memory, and statistics.
    pub core: PipelineCore<FlatMemory>,
    config: Config,
}

impl Simulator {
    /// Builds a simulator and loads `program` at the configured start pc.
    ///
    /// # Errors
    ///
    /// Returns [`SimError`] if the configuration is invalid or the program
    /// does not fit in memory.
    pub fn from_config(config: &Config, program: &[u8]) -> Result<Self, SimError> {
        config.validate()?;
        let mut mem = FlatMemory::new(config.memory.base, config.memory.size);
        let start = config.general.start_pc;
        mem.load(start, program)
            .map_err(|MemoryError { addr }| SimError::ProgramTooLarge {
                len: program.len(),
                addr,
            })?;
        info!(
            "loaded {} bytes at {start:#010x}; branch resolution in {:?}, forwarding {}",
            program.len(),
            config.pipeline.branch_resolution,
            if config.pipeline.forwarding { "on" } else { "off" }
        );
        Ok(Self {
            core: PipelineCore::with_memory(&config.pipeline, start, mem),
            config: config.clone(),
        })
    }

    /// Returns the configuration the simulator was built from.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Advances the simulator by one clock cycle.
    ///
    /// # Errors
    ///
    /// Propagates the core's [`PipelineError`].
    pub fn tick(&mut self) -> Result<&TickReport, PipelineError> {
        self.core.tick()
    }

    /// Runs until the core halts or `max_cycles` ticks have elapsed.
    ///
    /// # Errors
    ///
    /// Propagates the first [`PipelineError`] raised by the core.
    pub fn run(&mut self, max_cycles: u64) -> Result<RunOutcome, PipelineError> {
        let mut ticks = 0;
        while !self.core.halted() {
            if ticks == max_cycles {
                debug!("cycle limit of {max_cycles} reached");
                return Ok(RunOutcome::CycleLimit {
                    cycles: self.core.stats.cycles,
                });
            }
            let _ = self.core.tick()?;
            ticks += 1;
        }
        Ok(RunOutcome::Halted {
            cycles: self.core.stats.cycles,
        })
    }
}

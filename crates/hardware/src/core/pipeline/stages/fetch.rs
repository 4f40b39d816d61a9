//! Instruction Fetch (IF) Stage.
//!
//! This module implements the first stage of the instruction pipeline. Fetch
//! reads the word at the program counter and speculates that the next
//! instruction is at `pc + 4`. Redirects and halts from later stages are
//! applied to the program counter by the pipeline core.

use tracing::trace;

use crate::common::constants::INSTRUCTION_BYTES;
use crate::core::pipeline::bus::Packet;
use crate::core::pipeline::latches::FetchToDecodePacket;
use crate::soc::traits::MemoryPort;

/// Fetch's program counter register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgramCounter {
    pc: u32,
    enabled: bool,
}

impl ProgramCounter {
    /// Creates a program counter starting at `reset_pc` with fetch enabled.
    pub const fn new(reset_pc: u32) -> Self {
        Self {
            pc: reset_pc,
            enabled: true,
        }
    }

    /// Returns the address of the next fetch.
    pub const fn pc(&self) -> u32 {
        self.pc
    }

    /// Returns `false` once a halt has been decoded.
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Continues fetching at `target`.
    pub const fn redirect(&mut self, target: u32) {
        self.pc = target;
    }

    /// Stops fetching.
    pub const fn disable(&mut self) {
        self.enabled = false;
    }
}

/// Executes the instruction fetch stage.
///
/// # Arguments
///
/// * `pc` - Program counter; advanced to the fall-through address on a fetch.
/// * `mem` - Instruction memory. Unmapped addresses fetch as zero.
///
/// # Returns
///
/// The fetched packet, or a bubble once fetch has been disabled.
pub fn fetch_stage(pc: &mut ProgramCounter, mem: &mut impl MemoryPort) -> FetchToDecodePacket {
    if !pc.enabled {
        return FetchToDecodePacket::bubble();
    }
    let addr = pc.pc;
    let inst = mem.fetch_word(addr);
    trace!("IF  pc={addr:#010x} inst={inst:#010x}");
    pc.pc = addr.wrapping_add(INSTRUCTION_BYTES);
    FetchToDecodePacket {
        valid: true,
        pc: addr,
        inst,
    }
}

//! Writeback (WB) Stage.
//!
//! This module implements the final stage of the instruction pipeline. The
//! stage turns the Memory → Write-Back packet into the commit record that also
//! feeds the bypass network. The register file itself is updated by
//! [`retire`] at the clock edge, after Decode has read its operands.

use tracing::trace;

use crate::common::reg::RegisterFile;
use crate::core::pipeline::latches::{MemoryToWriteBackPacket, WriteBackToDecodeCommit};

/// Executes the writeback stage.
///
/// # Arguments
///
/// * `input` - Packet from Memory.
///
/// # Returns
///
/// The commit record; `valid` whenever an instruction retires.
pub fn wb_stage(input: &MemoryToWriteBackPacket) -> WriteBackToDecodeCommit {
    if input.valid {
        trace!(
            "WB  pc={:#010x} {}={:#010x}",
            input.pc, input.dest, input.value
        );
    }
    WriteBackToDecodeCommit {
        valid: input.valid,
        write_enable: input.write_enable(),
        dest: input.dest,
        value: input.value,
    }
}

/// Applies a commit record to the register file.
///
/// Only a valid, write-enabled record for a register other than `r0` has any effect.
pub const fn retire(commit: &WriteBackToDecodeCommit, regs: &mut RegisterFile) {
    if commit.valid && commit.write_enable {
        regs.write(commit.dest, commit.value);
    }
}

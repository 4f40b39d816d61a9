//! Memory Access (MEM) Stage.
//!
//! This module implements the fourth stage of the instruction pipeline. Loads
//! read the aligned word and extract their lanes; stores write their lanes
//! under the packet's byte enables. Memory is mutated only here.

use tracing::trace;

use crate::common::error::PipelineError;
use crate::core::pipeline::bus::Packet;
use crate::core::pipeline::latches::{
    ExecuteToMemoryPacket, MemoryToDecodeForward, MemoryToWriteBackPacket,
};
use crate::core::pipeline::signals::MemOp;
use crate::core::units::lsu::{Lsu, lanes};
use crate::soc::traits::MemoryPort;

/// Executes the memory stage.
///
/// # Arguments
///
/// * `input` - Packet from Execute.
/// * `mem` - Data memory.
///
/// # Returns
///
/// The Memory → Write-Back packet carrying the loaded value or Execute's result.
///
/// # Errors
///
/// Returns [`PipelineError::MemoryFault`] if the access is outside memory.
pub fn mem_stage(
    input: &ExecuteToMemoryPacket,
    mem: &mut impl MemoryPort,
) -> Result<MemoryToWriteBackPacket, PipelineError> {
    if !input.valid {
        return Ok(MemoryToWriteBackPacket::bubble());
    }

    let addr = input.result;
    let word_addr = lanes::word_address(addr);
    let fault = |_| PipelineError::MemoryFault { pc: input.pc, addr };

    let value = match input.mem_op {
        MemOp::Load | MemOp::LoadUnsigned => {
            let word = mem.read_word(word_addr).map_err(fault)?;
            let value = Lsu::extract(word, addr, input.size, input.mem_op);
            trace!("MEM pc={:#010x} load [{addr:#010x}] -> {value:#010x}", input.pc);
            value
        }
        MemOp::Store => {
            mem.write_word(word_addr, input.store_data, input.byte_enable)
                .map_err(fault)?;
            trace!(
                "MEM pc={:#010x} store [{addr:#010x}] <- {:#010x} be={:04b}",
                input.pc, input.store_data, input.byte_enable
            );
            input.result
        }
        MemOp::None => input.result,
    };

    Ok(MemoryToWriteBackPacket {
        valid: true,
        dest: input.dest,
        value,
        pc: input.pc,
    })
}

/// Derives the Memory → Decode forward from Memory's output latch.
pub const fn forward(output: &MemoryToWriteBackPacket) -> MemoryToDecodeForward {
    MemoryToDecodeForward {
        valid: output.valid,
        write_enable: output.write_enable(),
        load_pending: false,
        dest: output.dest,
        value: output.value,
    }
}

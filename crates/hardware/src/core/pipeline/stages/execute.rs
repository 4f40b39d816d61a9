//! Execute (EX) Stage.
//!
//! This module implements the third stage of the instruction pipeline. It
//! performs:
//! 1. **ALU Operations:** Arithmetic, logic, and shifts on the routed operands.
//! 2. **Address Generation:** `src1 + imm` for loads and stores, with byte lanes
//!    and lane-aligned store data for the memory port.
//! 3. **Link Values:** `pc + 4` for jumps.
//! 4. **Forwarding:** The Execute → Decode forward derived from the new latch.

use tracing::{debug, trace};

use crate::common::constants::INSTRUCTION_BYTES;
use crate::core::pipeline::bus::Packet;
use crate::core::pipeline::latches::{
    DecodeToExecutePacket, ExecuteToDecodeForward, ExecuteToMemoryPacket,
};
use crate::core::pipeline::signals::MemOp;
use crate::core::units::alu::Alu;
use crate::core::units::lsu::{Lsu, lanes};

/// Executes the execute stage.
///
/// # Arguments
///
/// * `input` - Packet from Decode.
///
/// # Returns
///
/// The Execute → Memory packet. Branches and halts produce no result.
pub fn execute_stage(input: &DecodeToExecutePacket) -> ExecuteToMemoryPacket {
    if !input.valid {
        return ExecuteToMemoryPacket::bubble();
    }

    let mut byte_enable = 0;
    let mut store_data = 0;
    let result = if input.mem_op.is_access() {
        let addr = input.src1.wrapping_add(input.imm);
        if lanes::is_misaligned(addr, input.size) {
            debug!(
                "EX  pc={:#010x} misaligned {:?} access at {addr:#010x}",
                input.pc, input.size
            );
        }
        let (enables, data) = Lsu::place(addr, input.size, input.src2);
        byte_enable = enables;
        if input.mem_op == MemOp::Store {
            store_data = data;
        }
        addr
    } else if input.control.is_jump() {
        input.pc.wrapping_add(INSTRUCTION_BYTES)
    } else if input.control.is_branch() {
        0
    } else {
        Alu::execute(input.alu_op, input.src1, input.src2)
    };

    trace!(
        "EX  pc={:#010x} {:?} result={result:#010x}",
        input.pc, input.alu_op
    );

    ExecuteToMemoryPacket {
        valid: true,
        pc: input.pc,
        result,
        store_data,
        dest: input.dest,
        mem_op: input.mem_op,
        byte_enable,
        size: input.size,
    }
}

/// Derives the Execute → Decode forward from Execute's output latch.
///
/// A load's value does not exist until Memory completes, so it is flagged
/// `load_pending`.
pub fn forward(output: &ExecuteToMemoryPacket) -> ExecuteToDecodeForward {
    ExecuteToDecodeForward {
        valid: output.valid,
        write_enable: output.valid && !output.dest.is_zero(),
        load_pending: output.valid && output.mem_op.is_load(),
        dest: output.dest,
        value: output.result,
    }
}

//! Instruction Decode (ID) Stage.
//!
//! This module implements the second stage of the instruction pipeline. It
//! performs:
//! 1. **Operand Read:** Each source register is resolved through the bypass
//!    network, falling back to the register file.
//! 2. **Operand Routing:** The decoded operand multiplexers place the pc, zero,
//!    or the immediate into the operand slots of the Decode → Execute packet.
//!
//! The hazard unit has already ruled on this tick; an operand that is still
//! unavailable here is a structural hazard.

use tracing::trace;

use crate::common::error::PipelineError;
use crate::common::reg::{RegId, RegisterFile};
use crate::core::pipeline::bus::Packet;
use crate::core::pipeline::bypass::{BypassLookup, BypassNetwork};
use crate::core::pipeline::latches::{DecodeToExecutePacket, FetchToDecodePacket};
use crate::isa::decode::{DecodedInstruction, OperandA, OperandB};
use crate::isa::disasm::disassemble;

/// Reads one source operand.
///
/// # Arguments
///
/// * `reg` - Source register.
/// * `pc` - Program counter of the reading instruction, for error reports.
/// * `bypass` - This tick's bypass network.
/// * `regs` - Architectural register file.
///
/// # Errors
///
/// Returns [`PipelineError::StructuralHazard`] if the register has an in-flight
/// producer whose value cannot be used this tick.
pub fn read_operand(
    reg: RegId,
    pc: u32,
    bypass: &BypassNetwork,
    regs: &RegisterFile,
) -> Result<u32, PipelineError> {
    let signal = bypass.resolve(reg);
    if signal.valid {
        return Ok(signal.value);
    }
    match bypass.lookup(reg) {
        BypassLookup::RegisterFile => Ok(regs.read(reg)),
        BypassLookup::Forwarded { .. } | BypassLookup::Pending { .. } => {
            Err(PipelineError::StructuralHazard { pc, reg })
        }
    }
}

/// Executes the instruction decode stage.
///
/// # Arguments
///
/// * `input` - Packet from Fetch.
/// * `decoded` - Control signals for `input.inst`.
/// * `bypass` - This tick's bypass network.
/// * `regs` - Architectural register file.
///
/// # Returns
///
/// The Decode → Execute packet carrying final operand values.
///
/// # Errors
///
/// Returns [`PipelineError::StructuralHazard`] when an operand is unavailable.
pub fn decode_stage(
    input: &FetchToDecodePacket,
    decoded: &DecodedInstruction,
    bypass: &BypassNetwork,
    regs: &RegisterFile,
) -> Result<DecodeToExecutePacket, PipelineError> {
    if !input.valid {
        return Ok(DecodeToExecutePacket::bubble());
    }
    trace!("ID  pc={:#010x} {}", input.pc, disassemble(input.inst));

    let rs1 = read_operand(decoded.rs1, input.pc, bypass, regs)?;
    let rs2 = read_operand(decoded.rs2, input.pc, bypass, regs)?;

    let src1 = match decoded.operand_a {
        OperandA::Register => rs1,
        OperandA::Pc => input.pc,
        OperandA::Zero => 0,
    };
    let src2 = match decoded.operand_b {
        OperandB::Register => rs2,
        OperandB::Immediate => decoded.imm,
    };

    Ok(DecodeToExecutePacket {
        valid: true,
        pc: input.pc,
        src1,
        src2,
        imm: decoded.imm,
        dest: decoded.dest,
        src1_id: decoded.rs1,
        src2_id: decoded.rs2,
        alu_op: decoded.alu_op,
        control: decoded.control,
        mem_op: decoded.mem_op,
        size: decoded.size,
    })
}

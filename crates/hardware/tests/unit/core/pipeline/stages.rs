//! Stage Logic Tests.
//!
//! Exercises each stage's combinational function in isolation: Fetch's
//! fall-through speculation, Decode's operand read through the bypass
//! network, Execute's result and lane placement, Memory's access, and
//! Write-Back's commit record.

use crate::common::builder::instruction::inst;
use pipesim_core::common::{PipelineError, RegId, RegisterFile};
use pipesim_core::core::pipeline::bus::Packet;
use pipesim_core::core::pipeline::bypass::BypassNetwork;
use pipesim_core::core::pipeline::latches::{
    DecodeToExecutePacket, ExecuteToDecodeForward, ExecuteToMemoryPacket, FetchToDecodePacket,
    MemoryToDecodeForward, MemoryToWriteBackPacket, WriteBackToDecodeCommit,
};
use pipesim_core::core::pipeline::signals::{AccessSize, AluOp, ControlKind, MemOp};
use pipesim_core::core::pipeline::stages::fetch::ProgramCounter;
use pipesim_core::core::pipeline::stages::{
    decode, decode_stage, execute, execute_stage, fetch_stage, mem_stage, memory, wb_stage,
    writeback,
};
use pipesim_core::isa::decode::{InstructionDecoder, Rv32Decoder};
use pipesim_core::soc::{FlatMemory, MemoryPort};
use pretty_assertions::assert_eq;

fn empty_bypass() -> BypassNetwork {
    BypassNetwork::from_buses(
        &ExecuteToDecodeForward::default(),
        &MemoryToDecodeForward::default(),
        &WriteBackToDecodeCommit::default(),
        true,
    )
}

fn fetched(pc: u32, word: u32) -> FetchToDecodePacket {
    FetchToDecodePacket {
        valid: true,
        pc,
        inst: word,
    }
}

// ══════════════════════════════════════════════════════════
// 1. Fetch
// ══════════════════════════════════════════════════════════

#[test]
fn fetch_speculates_fall_through() {
    let mut mem = FlatMemory::new(0, 64);
    mem.load(8, &0x0000_0013u32.to_le_bytes()).unwrap();
    let mut pc = ProgramCounter::new(8);
    let out = fetch_stage(&mut pc, &mut mem);
    assert_eq!(out, fetched(8, 0x13));
    assert_eq!(pc.pc(), 12);
    assert_eq!(out.fall_through(), 12);
}

#[test]
fn fetch_outside_memory_reads_a_nop_word() {
    let mut mem = FlatMemory::new(0, 16);
    let mut pc = ProgramCounter::new(0x1000);
    let out = fetch_stage(&mut pc, &mut mem);
    assert!(out.valid);
    assert_eq!(out.inst, 0);
}

#[test]
fn disabled_fetch_emits_bubbles() {
    let mut mem = FlatMemory::new(0, 16);
    let mut pc = ProgramCounter::new(0);
    pc.disable();
    assert!(!fetch_stage(&mut pc, &mut mem).is_valid());
    assert_eq!(pc.pc(), 0);
}

// ══════════════════════════════════════════════════════════
// 2. Decode
// ══════════════════════════════════════════════════════════

#[test]
fn decode_reads_register_file_and_immediate() {
    let word = inst().addi(3, 1, -5).build();
    let decoded = Rv32Decoder.decode(word);
    let mut regs = RegisterFile::new();
    regs.write(RegId::new(1), 100);

    let out = decode_stage(&fetched(0x20, word), &decoded, &empty_bypass(), &regs).unwrap();
    assert_eq!(out.src1, 100);
    assert_eq!(out.src2, (-5i32) as u32);
    assert_eq!(out.dest, RegId::new(3));
    assert_eq!(out.alu_op, AluOp::Add);
    assert_eq!(out.pc, 0x20);
}

#[test]
fn decode_prefers_forwarded_operands() {
    let word = inst().add(3, 1, 2).build();
    let decoded = Rv32Decoder.decode(word);
    let mut regs = RegisterFile::new();
    regs.write(RegId::new(1), 1);
    regs.write(RegId::new(2), 2);
    let bypass = BypassNetwork::from_buses(
        &ExecuteToDecodeForward {
            valid: true,
            write_enable: true,
            load_pending: false,
            dest: RegId::new(2),
            value: 20,
        },
        &MemoryToDecodeForward::default(),
        &WriteBackToDecodeCommit::default(),
        true,
    );
    let out = decode_stage(&fetched(0, word), &decoded, &bypass, &regs).unwrap();
    assert_eq!((out.src1, out.src2), (1, 20));
}

#[test]
fn reading_a_pending_operand_is_a_structural_hazard() {
    let bypass = BypassNetwork::from_buses(
        &ExecuteToDecodeForward {
            valid: true,
            write_enable: true,
            load_pending: true,
            dest: RegId::new(4),
            value: 0,
        },
        &MemoryToDecodeForward::default(),
        &WriteBackToDecodeCommit::default(),
        true,
    );
    let err = decode::read_operand(RegId::new(4), 0x40, &bypass, &RegisterFile::new());
    assert_eq!(
        err,
        Err(PipelineError::StructuralHazard {
            pc: 0x40,
            reg: RegId::new(4),
        })
    );
}

#[test]
fn decode_of_a_bubble_is_a_bubble() {
    let decoded = Rv32Decoder.decode(0x13);
    let out = decode_stage(
        &FetchToDecodePacket::bubble(),
        &decoded,
        &empty_bypass(),
        &RegisterFile::new(),
    )
    .unwrap();
    assert_eq!(out, DecodeToExecutePacket::bubble());
}

// ══════════════════════════════════════════════════════════
// 3. Execute
// ══════════════════════════════════════════════════════════

fn issued(alu_op: AluOp, src1: u32, src2: u32) -> DecodeToExecutePacket {
    DecodeToExecutePacket {
        valid: true,
        pc: 0x100,
        src1,
        src2,
        dest: RegId::new(7),
        alu_op,
        ..DecodeToExecutePacket::default()
    }
}

#[test]
fn execute_computes_alu_results() {
    assert_eq!(execute_stage(&issued(AluOp::Sub, 10, 3)).result, 7);
    assert_eq!(execute_stage(&issued(AluOp::Slt, u32::MAX, 0)).result, 1);
}

#[test]
fn execute_links_jumps_to_the_fall_through() {
    let jal = DecodeToExecutePacket {
        control: ControlKind::Jal,
        ..issued(AluOp::Add, 0, 0)
    };
    assert_eq!(execute_stage(&jal).result, 0x104);
}

#[test]
fn execute_places_store_data_in_its_lanes() {
    let sb = DecodeToExecutePacket {
        mem_op: MemOp::Store,
        size: AccessSize::Byte,
        imm: 2,
        dest: RegId::ZERO,
        ..issued(AluOp::Add, 0x200, 0xAB)
    };
    let out = execute_stage(&sb);
    assert_eq!(out.result, 0x202);
    assert_eq!(out.byte_enable, 0b0100);
    assert_eq!(out.store_data, 0x00AB_0000);
}

#[test]
fn execute_forward_flags_loads_as_pending() {
    let lw = DecodeToExecutePacket {
        mem_op: MemOp::Load,
        size: AccessSize::Word,
        ..issued(AluOp::Add, 0x200, 0)
    };
    let fwd = execute::forward(&execute_stage(&lw));
    assert!(fwd.load_pending);
    assert!(fwd.write_enable);
    let alu = execute::forward(&execute_stage(&issued(AluOp::Add, 1, 2)));
    assert!(!alu.load_pending);
    assert_eq!(alu.value, 3);
}

// ══════════════════════════════════════════════════════════
// 4. Memory
// ══════════════════════════════════════════════════════════

fn access(mem_op: MemOp, size: AccessSize, addr: u32, byte_enable: u8, data: u32) -> ExecuteToMemoryPacket {
    ExecuteToMemoryPacket {
        valid: true,
        pc: 0x10,
        result: addr,
        store_data: data,
        dest: if mem_op == MemOp::Store { RegId::ZERO } else { RegId::new(5) },
        mem_op,
        byte_enable,
        size,
    }
}

#[test]
fn memory_stores_only_enabled_lanes() {
    let mut mem = FlatMemory::new(0, 64);
    mem.write_word(0x20, 0x1122_3344, 0b1111).unwrap();
    let _ = mem_stage(&access(MemOp::Store, AccessSize::Half, 0x22, 0b1100, 0xBEEF_0000), &mut mem)
        .unwrap();
    assert_eq!(mem.read_word(0x20).unwrap(), 0xBEEF_3344);
}

#[test]
fn memory_sign_and_zero_extends_loads() {
    let mut mem = FlatMemory::new(0, 64);
    mem.write_word(0x20, 0x0000_80FF, 0b1111).unwrap();
    let lb = mem_stage(&access(MemOp::Load, AccessSize::Byte, 0x20, 0b0001, 0), &mut mem).unwrap();
    let lbu = mem_stage(&access(MemOp::LoadUnsigned, AccessSize::Byte, 0x20, 0b0001, 0), &mut mem)
        .unwrap();
    let lh = mem_stage(&access(MemOp::Load, AccessSize::Half, 0x20, 0b0011, 0), &mut mem).unwrap();
    assert_eq!(lb.value, 0xFFFF_FFFF);
    assert_eq!(lbu.value, 0xFF);
    assert_eq!(lh.value, 0xFFFF_80FF);
    assert!(memory::forward(&lh).write_enable);
}

#[test]
fn memory_fault_names_the_instruction() {
    let mut mem = FlatMemory::new(0, 64);
    let err = mem_stage(&access(MemOp::Load, AccessSize::Word, 0x1000, 0b1111, 0), &mut mem);
    assert_eq!(
        err,
        Err(PipelineError::MemoryFault {
            pc: 0x10,
            addr: 0x1000,
        })
    );
}

// ══════════════════════════════════════════════════════════
// 5. Write-Back
// ══════════════════════════════════════════════════════════

#[test]
fn writeback_commits_once_and_ignores_r0() {
    let mut regs = RegisterFile::new();
    let to_r5 = MemoryToWriteBackPacket {
        valid: true,
        dest: RegId::new(5),
        value: 9,
        pc: 0,
    };
    let commit = wb_stage(&to_r5);
    assert!(commit.write_enable);
    writeback::retire(&commit, &mut regs);
    assert_eq!(regs.read(RegId::new(5)), 9);

    let to_r0 = MemoryToWriteBackPacket {
        dest: RegId::ZERO,
        ..to_r5
    };
    let commit = wb_stage(&to_r0);
    assert!(commit.valid && !commit.write_enable);
    writeback::retire(&commit, &mut regs);
    assert_eq!(regs.read(RegId::ZERO), 0);
}

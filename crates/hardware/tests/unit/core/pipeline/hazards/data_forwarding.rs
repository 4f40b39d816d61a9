//! Data Forwarding Tests.
//!
//! Verifies the bypass network's priority order (Execute, then Memory, then
//! Write-Back, then the register file), that `r0` never forwards, and that
//! forwarded operands equal the values later written back.

use crate::common::builder::instruction::inst;
use crate::common::harness::TestContext;
use pipesim_core::common::RegId;
use pipesim_core::core::pipeline::bypass::{BypassLookup, BypassNetwork, ForwardOrigin};
use pipesim_core::core::pipeline::latches::{
    ExecuteToDecodeForward, MemoryToDecodeForward, WriteBackToDecodeCommit,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn ex(dest: u8, value: u32, load_pending: bool) -> ExecuteToDecodeForward {
    ExecuteToDecodeForward {
        valid: true,
        write_enable: dest != 0,
        load_pending,
        dest: RegId::new(dest),
        value,
    }
}

fn mem(dest: u8, value: u32) -> MemoryToDecodeForward {
    MemoryToDecodeForward {
        valid: true,
        write_enable: dest != 0,
        load_pending: false,
        dest: RegId::new(dest),
        value,
    }
}

fn wb(dest: u8, value: u32) -> WriteBackToDecodeCommit {
    WriteBackToDecodeCommit {
        valid: true,
        write_enable: dest != 0,
        dest: RegId::new(dest),
        value,
    }
}

// ══════════════════════════════════════════════════════════
// 1. Bypass network in isolation
// ══════════════════════════════════════════════════════════

#[test]
fn youngest_producer_wins() {
    let net = BypassNetwork::from_buses(&ex(5, 1, false), &mem(5, 2), &wb(5, 3), true);
    let signal = net.resolve(RegId::new(5));
    assert!(signal.valid);
    assert_eq!(signal.value, 1);
}

#[test]
fn memory_beats_writeback() {
    let net = BypassNetwork::from_buses(&ex(6, 1, false), &mem(5, 2), &wb(5, 3), true);
    assert_eq!(
        net.lookup(RegId::new(5)),
        BypassLookup::Forwarded {
            origin: ForwardOrigin::Memory,
            value: 2
        }
    );
}

#[test]
fn no_match_reads_the_register_file() {
    let net = BypassNetwork::from_buses(&ex(6, 1, false), &mem(7, 2), &wb(8, 3), true);
    assert_eq!(net.lookup(RegId::new(5)), BypassLookup::RegisterFile);
    assert!(!net.resolve(RegId::new(5)).valid);
}

#[test]
fn r0_never_forwards() {
    let net = BypassNetwork::from_buses(&ex(0, 1, false), &mem(0, 2), &wb(0, 3), true);
    assert!(!net.resolve(RegId::ZERO).valid);
    assert_eq!(net.lookup(RegId::ZERO), BypassLookup::RegisterFile);
}

#[test]
fn pending_load_shadows_older_producers() {
    let net = BypassNetwork::from_buses(&ex(5, 0, true), &mem(5, 2), &wb(5, 3), true);
    assert_eq!(
        net.lookup(RegId::new(5)),
        BypassLookup::Pending {
            origin: ForwardOrigin::Execute
        }
    );
    assert!(!net.resolve(RegId::new(5)).valid);
}

#[test]
fn disabled_forwarding_never_overrides_the_register_file() {
    let net = BypassNetwork::from_buses(&ex(5, 1, false), &mem(5, 2), &wb(5, 3), false);
    assert!(!net.resolve(RegId::new(5)).valid);
    assert!(matches!(
        net.lookup(RegId::new(5)),
        BypassLookup::Forwarded { .. }
    ));
}

// ══════════════════════════════════════════════════════════
// 2. Forwarding in the running core
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::execute(0, ForwardOrigin::Execute)]
#[case::memory(1, ForwardOrigin::Memory)]
#[case::writeback(2, ForwardOrigin::WriteBack)]
fn producer_distance_selects_the_forwarding_stage(
    #[case] gap: usize,
    #[case] origin: ForwardOrigin,
) {
    let mut program = vec![inst().addi(1, 0, 11).build()];
    program.extend(std::iter::repeat_n(inst().nop().build(), gap));
    program.push(inst().add(2, 1, 0).build());
    program.push(inst().ecall().build());

    let mut ctx = TestContext::new().load_program(&program);
    let reports = ctx.run_to_halt(30);
    let stats = &ctx.core.stats;
    let counts = [stats.forwards_ex, stats.forwards_mem, stats.forwards_wb];
    let expected = match origin {
        ForwardOrigin::Execute => [1, 0, 0],
        ForwardOrigin::Memory => [0, 1, 0],
        ForwardOrigin::WriteBack => [0, 0, 1],
    };
    assert_eq!(counts, expected);
    assert!(reports.iter().all(|r| !r.hazard.stall()));
    assert_eq!(ctx.get_reg(2), 11);
}

#[test]
fn producer_four_ahead_reads_the_register_file() {
    let program = vec![
        inst().addi(1, 0, 11).build(),
        inst().nop().build(),
        inst().nop().build(),
        inst().nop().build(),
        inst().add(2, 1, 0).build(),
        inst().ecall().build(),
    ];
    let mut ctx = TestContext::new().load_program(&program);
    let _ = ctx.run_to_halt(30);
    let stats = &ctx.core.stats;
    assert_eq!(stats.forwards_ex + stats.forwards_mem + stats.forwards_wb, 0);
    assert_eq!(ctx.get_reg(2), 11);
}

#[test]
fn back_to_back_redefinition_forwards_the_newest_value() {
    let program = vec![
        inst().addi(1, 0, 1).build(),
        inst().addi(1, 0, 2).build(),
        inst().add(2, 1, 0).build(),
        inst().ecall().build(),
    ];
    let mut ctx = TestContext::new().load_program(&program);
    let _ = ctx.run_to_halt(30);
    assert_eq!(ctx.get_reg(2), 2);
}

#[test]
fn store_data_is_forwarded() {
    let program = vec![
        inst().addi(1, 0, 77).build(),
        inst().sw(0, 1, 0x100).build(),
        inst().ecall().build(),
    ];
    let mut ctx = TestContext::new().load_program(&program);
    let _ = ctx.run_to_halt(30);
    assert_eq!(ctx.read_word(0x100), 77);
}

#[test]
fn forwarded_operand_equals_the_value_written_back() {
    let program = vec![
        inst().addi(1, 0, 40).build(),
        inst().addi(1, 1, 2).build(),
        inst().add(2, 1, 1).build(),
        inst().ecall().build(),
    ];
    let mut ctx = TestContext::new().load_program(&program);

    let mut forwarded = None;
    let mut committed = None;
    while !ctx.core.halted() {
        let _ = ctx.tick();
        let id_ex = *ctx.core.id_ex();
        if id_ex.valid && id_ex.pc == 8 && forwarded.is_none() {
            forwarded = Some(id_ex.src1);
        }
        let commit = *ctx.core.wb_commit();
        if commit.write_enable && commit.dest == RegId::new(1) {
            committed = Some(commit.value);
        }
    }
    assert_eq!(forwarded, Some(42));
    assert_eq!(committed, forwarded);
}

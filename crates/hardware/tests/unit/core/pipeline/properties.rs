//! Whole-Core Property Tests.
//!
//! Verifies properties that must hold for every program:
//! 1. **Throughput:** Hazard-free code retires one instruction per cycle once the pipeline is full.
//! 2. **Sequential Equivalence:** Registers, memory, and the retired instruction stream match a
//!    one-instruction-at-a-time interpreter, under every branch placement and forwarding mode.

use crate::common::builder::instruction::inst;
use crate::common::harness::{Reference, TestContext};
use pipesim_core::config::{BranchResolution, PipelineConfig};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const DATA_LO: usize = 0x400;
const DATA_HI: usize = 0x800;

// ══════════════════════════════════════════════════════════
// 1. Throughput
// ══════════════════════════════════════════════════════════

#[test]
fn independent_instructions_retire_every_cycle() {
    let n = 64;
    let mut program: Vec<u32> = (0..n)
        .map(|i| inst().addi(1 + (i % 8), 0, i as i32).build())
        .collect();
    program.push(inst().ecall().build());

    let mut ctx = TestContext::new().load_program(&program);
    let reports = ctx.run_to_halt(200);

    // Fill takes four cycles; after that one retirement per cycle.
    assert!(reports[..4].iter().all(|r| r.retired_pc.is_none()));
    assert!(reports[4..].iter().all(|r| r.retired_pc.is_some()));
    assert_eq!(reports.len(), n as usize + 1 + 4);
    assert_eq!(ctx.core.stats.instructions_retired, u64::from(n) + 1);
    assert!(ctx.core.stats.ipc() > 0.9);
}

#[test]
fn dependent_alu_chain_also_retires_every_cycle() {
    let mut program: Vec<u32> = (0..32).map(|_| inst().addi(1, 1, 1).build()).collect();
    program.push(inst().ecall().build());

    let mut ctx = TestContext::new().load_program(&program);
    let reports = ctx.run_to_halt(100);
    assert_eq!(reports.len(), 33 + 4);
    assert_eq!(ctx.get_reg(1), 32);
    assert_eq!(ctx.core.stats.stalls_data, 0);
}

// ══════════════════════════════════════════════════════════
// 2. Equivalence with sequential execution
// ══════════════════════════════════════════════════════════

/// One randomly chosen instruction. Control transfers only jump forward, so
/// every generated program terminates at its final `ecall`.
#[derive(Clone, Copy, Debug)]
enum Op {
    Addi { rd: u32, rs1: u32, imm: i32 },
    Add { rd: u32, rs1: u32, rs2: u32 },
    Sub { rd: u32, rs1: u32, rs2: u32 },
    Xor { rd: u32, rs1: u32, rs2: u32 },
    Slt { rd: u32, rs1: u32, rs2: u32 },
    Lw { rd: u32, slot: i32 },
    Lb { rd: u32, slot: i32 },
    Lbu { rd: u32, slot: i32 },
    Sw { rs2: u32, slot: i32 },
    Sb { rs2: u32, slot: i32 },
    Beq { rs1: u32, rs2: u32, skip: i32 },
    Bne { rs1: u32, rs2: u32, skip: i32 },
    Blt { rs1: u32, rs2: u32, skip: i32 },
    Jal { rd: u32, skip: i32 },
}

impl Op {
    fn encode(self, index: usize, len: usize) -> u32 {
        // Forward offsets never pass the trailing ecall at `len`.
        let fwd = |skip: i32| 4 * skip.min((len - index) as i32);
        let addr = |slot: i32| DATA_LO as i32 + 4 * slot;
        match self {
            Self::Addi { rd, rs1, imm } => inst().addi(rd, rs1, imm).build(),
            Self::Add { rd, rs1, rs2 } => inst().add(rd, rs1, rs2).build(),
            Self::Sub { rd, rs1, rs2 } => inst().sub(rd, rs1, rs2).build(),
            Self::Xor { rd, rs1, rs2 } => inst().xor(rd, rs1, rs2).build(),
            Self::Slt { rd, rs1, rs2 } => inst().slt(rd, rs1, rs2).build(),
            Self::Lw { rd, slot } => inst().lw(rd, 0, addr(slot)).build(),
            Self::Lb { rd, slot } => inst().lb(rd, 0, addr(slot) + 3).build(),
            Self::Lbu { rd, slot } => inst().lbu(rd, 0, addr(slot) + 1).build(),
            Self::Sw { rs2, slot } => inst().sw(0, rs2, addr(slot)).build(),
            Self::Sb { rs2, slot } => inst().sb(0, rs2, addr(slot) + 2).build(),
            Self::Beq { rs1, rs2, skip } => inst().beq(rs1, rs2, fwd(skip)).build(),
            Self::Bne { rs1, rs2, skip } => inst().bne(rs1, rs2, fwd(skip)).build(),
            Self::Blt { rs1, rs2, skip } => inst().blt(rs1, rs2, fwd(skip)).build(),
            Self::Jal { rd, skip } => inst().jal(rd, fwd(skip)).build(),
        }
    }
}

fn op() -> impl Strategy<Value = Op> {
    // A small register pool makes dependencies frequent.
    let r = || 0u32..6;
    let slot = || 0i32..8;
    let skip = || 1i32..5;
    prop_oneof![
        4 => (r(), r(), -64i32..64).prop_map(|(rd, rs1, imm)| Op::Addi { rd, rs1, imm }),
        2 => (r(), r(), r()).prop_map(|(rd, rs1, rs2)| Op::Add { rd, rs1, rs2 }),
        1 => (r(), r(), r()).prop_map(|(rd, rs1, rs2)| Op::Sub { rd, rs1, rs2 }),
        1 => (r(), r(), r()).prop_map(|(rd, rs1, rs2)| Op::Xor { rd, rs1, rs2 }),
        1 => (r(), r(), r()).prop_map(|(rd, rs1, rs2)| Op::Slt { rd, rs1, rs2 }),
        2 => (r(), slot()).prop_map(|(rd, slot)| Op::Lw { rd, slot }),
        1 => (r(), slot()).prop_map(|(rd, slot)| Op::Lb { rd, slot }),
        1 => (r(), slot()).prop_map(|(rd, slot)| Op::Lbu { rd, slot }),
        2 => (r(), slot()).prop_map(|(rs2, slot)| Op::Sw { rs2, slot }),
        1 => (r(), slot()).prop_map(|(rs2, slot)| Op::Sb { rs2, slot }),
        1 => (r(), r(), skip()).prop_map(|(rs1, rs2, skip)| Op::Beq { rs1, rs2, skip }),
        1 => (r(), r(), skip()).prop_map(|(rs1, rs2, skip)| Op::Bne { rs1, rs2, skip }),
        1 => (r(), r(), skip()).prop_map(|(rs1, rs2, skip)| Op::Blt { rs1, rs2, skip }),
        1 => (r(), skip()).prop_map(|(rd, skip)| Op::Jal { rd, skip }),
    ]
}

fn assemble(ops: &[Op]) -> Vec<u32> {
    let mut program: Vec<u32> = ops
        .iter()
        .enumerate()
        .map(|(i, op)| op.encode(i, ops.len()))
        .collect();
    program.push(inst().ecall().build());
    program
}

fn pipeline_config() -> impl Strategy<Value = PipelineConfig> {
    (any::<bool>(), any::<bool>()).prop_map(|(execute, forwarding)| PipelineConfig {
        branch_resolution: if execute {
            BranchResolution::Execute
        } else {
            BranchResolution::Decode
        },
        forwarding,
        verify_buses: true,
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn pipeline_matches_sequential_execution(
        ops in prop::collection::vec(op(), 1..32),
        config in pipeline_config(),
    ) {
        let program = assemble(&ops);
        let expected = Reference::new(&program).run(10_000);

        let mut ctx = TestContext::with_config(config).load_program(&program);
        let _ = ctx.run_to_halt(10_000);

        prop_assert_eq!(ctx.core.regs(), &expected.regs);
        prop_assert_eq!(ctx.retired(), expected.retired);
        let data = ctx.core.memory().read_bytes(DATA_LO as u32, DATA_HI - DATA_LO).unwrap();
        prop_assert_eq!(data, &expected.memory[DATA_LO..DATA_HI]);
    }

    #[test]
    fn stalls_only_come_from_in_flight_producers(
        ops in prop::collection::vec(op(), 1..32),
    ) {
        let program = assemble(&ops);
        let mut ctx = TestContext::new().load_program(&program);
        let reports = ctx.run_to_halt(10_000);
        // With forwarding, only a load directly ahead of its consumer stalls,
        // and each such stall lasts one cycle.
        for pair in reports.windows(2) {
            prop_assert!(!(pair[0].hazard.stall() && pair[1].hazard.stall()));
        }
    }
}

//! Memory Port Tests.
//!
//! Covers the flat RAM's byte lanes and bounds, speculative fetch of unmapped
//! words, and the core's handling of a faulting data access through a mocked
//! port.

use crate::common::builder::instruction::inst;
use crate::common::mocks::memory::{MockMemory, program_memory};
use mockall::predicate::eq;
use pipesim_core::PipelineCore;
use pipesim_core::common::{PipelineError, RegId};
use pipesim_core::config::PipelineConfig;
use pipesim_core::soc::{FlatMemory, MemoryError, MemoryPort};
use pretty_assertions::assert_eq;

// ══════════════════════════════════════════════════════════
// 1. Flat RAM
// ══════════════════════════════════════════════════════════

#[test]
fn byte_enables_select_lanes() {
    let mut mem = FlatMemory::new(0x1000, 16);
    mem.write_word(0x1004, 0x1122_3344, 0b1111).unwrap();
    mem.write_word(0x1004, 0xAABB_CCDD, 0b1001).unwrap();
    assert_eq!(mem.read_word(0x1004).unwrap(), 0xAA22_33DD);
    assert_eq!(mem.read_bytes(0x1004, 2).unwrap(), &[0xDD, 0x33]);
}

#[test]
fn accesses_outside_region_fault_with_address() {
    let mut mem = FlatMemory::new(0x1000, 16);
    assert_eq!(
        mem.write_word(0x1010, 0, 0b1111),
        Err(MemoryError { addr: 0x1010 })
    );
    assert_eq!(mem.read_word(0x0FFC), Err(MemoryError { addr: 0x0FFC }));
    assert!(mem.read_bytes(0x100E, 4).is_err());
}

#[test]
fn fetch_of_unmapped_word_reads_zero() {
    let mut mem = FlatMemory::new(0x1000, 16);
    mem.load(0x1000, &0x0000_0013u32.to_le_bytes()).unwrap();
    assert_eq!(mem.fetch_word(0x1000), 0x13);
    assert_eq!(mem.fetch_word(0x2000), 0);
}

#[test]
fn geometry_accessors() {
    let mem = FlatMemory::new(0x8000, 256);
    assert_eq!((mem.base(), mem.size()), (0x8000, 256));
}

// ══════════════════════════════════════════════════════════
// 2. Core against a scripted port
// ══════════════════════════════════════════════════════════

fn core_with(mem: MockMemory) -> PipelineCore<MockMemory> {
    PipelineCore::with_memory(&PipelineConfig::default(), 0, mem)
}

#[test]
fn faulting_load_surfaces_memory_fault() {
    let mut mem = program_memory(vec![
        inst().lw(1, 0, 0x100).build(),
        inst().ecall().build(),
    ]);
    let _ = mem
        .expect_read_word()
        .with(eq(0x100))
        .times(1)
        .returning(|addr| Err(MemoryError { addr }));
    let mut core = core_with(mem);

    let err = (0..10)
        .find_map(|_| core.tick().err())
        .expect("load should fault");
    assert_eq!(err, PipelineError::MemoryFault { pc: 0, addr: 0x100 });
}

#[test]
fn memory_fault_leaves_the_core_untouched() {
    let mut mem = program_memory(vec![
        inst().addi(2, 0, 7).build(),
        inst().lw(1, 0, 0x100).build(),
        inst().ecall().build(),
    ]);
    let _ = mem
        .expect_read_word()
        .with(eq(0x100))
        .times(2)
        .returning(|addr| Err(MemoryError { addr }));
    let mut core = core_with(mem);

    let mut last_cycle = 0;
    let err = loop {
        match core.tick() {
            Ok(report) => last_cycle = report.cycle,
            Err(err) => break err,
        }
    };
    assert_eq!(err, PipelineError::MemoryFault { pc: 4, addr: 0x100 });
    // The ADDI ahead of the load would have retired on the faulting tick.
    let snapshot = (
        core.stats.cycles,
        core.stats.instructions_retired,
        core.regs().read(RegId::new(2)),
        core.commit_trace().count(),
        core.stage_states(),
    );
    assert_eq!(snapshot, (last_cycle, 0, 0, 0, core.last_tick().states));

    assert_eq!(core.tick().err(), Some(err));
    assert_eq!(core.stats.cycles, last_cycle);
    assert_eq!(core.stats.instructions_retired, 0);
}

#[test]
fn sub_word_store_is_sent_with_lane_mask() {
    let mut mem = program_memory(vec![
        inst().addi(1, 0, 0x7F).build(),
        inst().sb(0, 1, 0x103).build(),
        inst().ecall().build(),
    ]);
    let _ = mem
        .expect_write_word()
        .with(eq(0x100), eq(0x7F00_0000), eq(0b1000))
        .times(1)
        .returning(|_, _, _| Ok(()));
    let mut core = core_with(mem);

    for _ in 0..20 {
        if core.halted() {
            break;
        }
        let _ = core.tick().unwrap();
    }
    assert!(core.halted());
}

#[test]
fn loads_read_through_the_port() {
    let mut mem = program_memory(vec![
        inst().lh(2, 0, 0x202).build(),
        inst().ecall().build(),
    ]);
    let _ = mem
        .expect_read_word()
        .with(eq(0x200))
        .times(1)
        .returning(|_| Ok(0x8001_0000));
    let mut core = core_with(mem);

    while !core.halted() {
        let _ = core.tick().unwrap();
    }
    assert_eq!(core.regs().read(RegId::new(2)), 0xFFFF_8001);
}

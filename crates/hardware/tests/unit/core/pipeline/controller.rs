//! Stage Controller Tests.
//!
//! Verifies the per-stage state machine: reset state, the valid/ready
//! handshake, stall idempotence, and flush dominating stall.

use pipesim_core::common::PipelineError;
use pipesim_core::core::pipeline::bus::Packet;
use pipesim_core::core::pipeline::controller::{
    StageControl, StageController, StageId, StageState,
};
use pipesim_core::core::pipeline::latches::FetchToDecodePacket;
use pretty_assertions::assert_eq;

const STALL: StageControl = StageControl {
    stall: true,
    flush: false,
};
const FLUSH: StageControl = StageControl {
    stall: false,
    flush: true,
};
const BOTH: StageControl = StageControl {
    stall: true,
    flush: true,
};

fn fetched(pc: u32) -> FetchToDecodePacket {
    FetchToDecodePacket {
        valid: true,
        pc,
        inst: 0x0000_0013,
    }
}

fn running(pc: u32) -> StageController<FetchToDecodePacket> {
    let mut ctl = StageController::new(StageId::Fetch);
    let _ = ctl.advance(pc, StageControl::RUN, fetched);
    ctl
}

// ══════════════════════════════════════════════════════════
// 1. Reset and handshake
// ══════════════════════════════════════════════════════════

#[test]
fn new_controller_is_empty_with_a_bubble() {
    let ctl: StageController<FetchToDecodePacket> = StageController::new(StageId::Decode);
    assert_eq!(ctl.state(), StageState::Empty);
    assert_eq!(ctl.stage(), StageId::Decode);
    assert!(!ctl.pending().is_valid());
}

#[test]
fn output_is_read_exactly_once() {
    let mut ctl = running(0x40);
    assert_eq!(ctl.state(), StageState::Running);
    assert_eq!(ctl.hand_off(), fetched(0x40));
    assert!(!ctl.pending().is_valid(), "second read must see a bubble");
    // The latch itself is unchanged.
    assert_eq!(*ctl.output(), fetched(0x40));
}

#[test]
fn reset_returns_to_empty() {
    let mut ctl = running(0x40);
    ctl.reset();
    assert_eq!(ctl.state(), StageState::Empty);
    assert_eq!(*ctl.output(), FetchToDecodePacket::bubble());
}

// ══════════════════════════════════════════════════════════
// 2. Stall
// ══════════════════════════════════════════════════════════

#[test]
fn stall_freezes_output_bit_for_bit() {
    let mut ctl = running(0x40);
    let before = ctl.output().pack().unwrap();
    let _ = ctl.advance(0x44, STALL, |_| panic!("stalled stage must not compute"));
    let _ = ctl.advance(0x48, STALL, |_| panic!("stalled stage must not compute"));
    assert_eq!(ctl.state(), StageState::Stalled);
    assert_eq!(ctl.output().pack().unwrap(), before);
}

#[test]
fn stall_keeps_an_unread_output_pending() {
    let mut ctl = running(0x40);
    let _ = ctl.advance(0x44, STALL, fetched);
    assert_eq!(ctl.pending(), fetched(0x40));
}

#[test]
fn stall_after_hand_off_gives_the_consumer_a_bubble() {
    let mut ctl = running(0x40);
    let _ = ctl.hand_off();
    let _ = ctl.advance(0x44, STALL, fetched);
    assert!(!ctl.pending().is_valid());
}

#[test]
fn stall_controls_do_not_consume_input() {
    assert!(!STALL.consumes_input());
    assert!(StageControl::RUN.consumes_input());
    assert!(BOTH.consumes_input());
}

// ══════════════════════════════════════════════════════════
// 3. Flush
// ══════════════════════════════════════════════════════════

#[test]
fn flush_emits_a_bubble() {
    let mut ctl = running(0x40);
    let out = *ctl.advance(0x44, FLUSH, fetched);
    assert!(!out.is_valid());
    assert_eq!(ctl.state(), StageState::Flushed);
}

#[test]
fn flush_dominates_stall() {
    let mut ctl = running(0x40);
    let out = *ctl.advance(0x44, BOTH, fetched);
    assert!(!out.is_valid());
    assert_eq!(ctl.state(), StageState::Flushed);
    assert_eq!(ctl.check_control(BOTH), Ok(()));
}

#[test]
fn check_control_reports_a_stage_that_ignored_flush() {
    let ctl = running(0x40);
    assert_eq!(
        ctl.check_control(BOTH),
        Err(PipelineError::FlushStallConflict {
            stage: StageId::Fetch,
            state: StageState::Running,
        })
    );
}

#[test]
fn failed_compute_leaves_the_latch_untouched() {
    let mut ctl = running(0x40);
    let result = ctl.try_advance(0x44, StageControl::RUN, |_| Err("boom"));
    assert_eq!(result.err(), Some("boom"));
    assert_eq!(*ctl.output(), fetched(0x40));
    assert_eq!(ctl.state(), StageState::Running);
}

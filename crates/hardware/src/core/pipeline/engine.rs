//! Pipeline core.
//!
//! `PipelineCore` composes the five stage controllers with the hazard unit,
//! the bypass network, and the branch resolution unit into one synchronous
//! machine. One call to [`PipelineCore::tick`] is one clock cycle:
//! 1. **Write-Back** forms the commit record from the Memory latch.
//! 2. **Memory** performs its load or store.
//! 3. **Execute** computes; its new latch drives the Execute forward, and it
//!    resolves control transfers when the unit is placed in Execute.
//! 4. **Decode** consults the hazard unit, reads operands through the bypass
//!    network, and resolves control transfers when placed in Decode.
//! 5. **Fetch** applies stall, flush, and redirect to the program counter.
//! 6. The commit record is written to the register file at the clock edge.
//!
//! Stages are evaluated downstream first so every feedback bus a stage
//! consumes has already been produced this tick.

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::common::constants::COMMIT_TRACE_MAX;
use crate::common::error::PipelineError;
use crate::common::reg::RegisterFile;
use crate::config::{BranchResolution, PipelineConfig};
use crate::core::pipeline::branch::BranchResolutionUnit;
use crate::core::pipeline::bus::{Packet, verify_round_trip};
use crate::core::pipeline::bypass::{BypassLookup, BypassNetwork};
use crate::core::pipeline::controller::{StageControl, StageController, StageId, StageState};
use crate::core::pipeline::hazards::{HazardDecision, HazardUnit};
use crate::core::pipeline::latches::{
    DecodeToExecutePacket, DecodeToFetchRedirect, ExecuteToMemoryPacket, FetchToDecodePacket,
    MemoryToWriteBackPacket, WriteBackToDecodeCommit,
};
use crate::core::pipeline::signals::ControlKind;
use crate::core::pipeline::stages::fetch::ProgramCounter;
use crate::core::pipeline::stages::{decode, execute, fetch, memory, writeback};
use crate::isa::decode::{DecodedInstruction, InstructionDecoder, Rv32Decoder};
use crate::soc::memory::FlatMemory;
use crate::soc::traits::MemoryPort;
use crate::stats::SimStats;

/// What happened on one tick, for tracing and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Cycle number of the tick (first tick is 1).
    pub cycle: u64,
    /// Stage states after the tick, in program order.
    pub states: [StageState; 5],
    /// Hazard unit decision for the instruction in Decode.
    pub hazard: HazardDecision,
    /// Redirect applied to Fetch.
    pub redirect: DecodeToFetchRedirect,
    /// Valid instructions discarded by flushes.
    pub squashed: u32,
    /// Program counter of the instruction that retired, if any.
    pub retired_pc: Option<u32>,
    /// A halt was decoded and Fetch was disabled.
    pub halt_decoded: bool,
}

/// Five-stage scalar pipeline.
///
/// Generic over the memory subsystem and the instruction decoder, which are
/// external collaborators with simple contracts.
#[derive(Debug)]
pub struct PipelineCore<M = FlatMemory, D = Rv32Decoder> {
    if_ctl: StageController<FetchToDecodePacket>,
    id_ctl: StageController<DecodeToExecutePacket>,
    ex_ctl: StageController<ExecuteToMemoryPacket>,
    mem_ctl: StageController<MemoryToWriteBackPacket>,
    wb_ctl: StageController<WriteBackToDecodeCommit>,

    pc: ProgramCounter,
    reset_pc: u32,
    hazard_unit: HazardUnit,
    branch_unit: BranchResolutionUnit,
    verify_buses: bool,

    regs: RegisterFile,
    mem: M,
    decoder: D,

    last_tick: TickReport,
    commit_trace: VecDeque<u32>,
    /// Performance counters.
    pub stats: SimStats,
}

impl<M: MemoryPort> PipelineCore<M, Rv32Decoder> {
    /// Creates a core with the default RV32I decoder.
    pub fn with_memory(config: &PipelineConfig, reset_pc: u32, mem: M) -> Self {
        Self::new(config, reset_pc, mem, Rv32Decoder)
    }
}

impl<M: MemoryPort, D: InstructionDecoder> PipelineCore<M, D> {
    /// Creates a core in the reset state.
    ///
    /// # Arguments
    ///
    /// * `config` - Hazard handling: branch placement, forwarding, bus verification.
    /// * `reset_pc` - Address of the first instruction.
    /// * `mem` - Instruction and data memory.
    /// * `decoder` - Instruction decoder.
    pub fn new(config: &PipelineConfig, reset_pc: u32, mem: M, decoder: D) -> Self {
        Self {
            if_ctl: StageController::new(StageId::Fetch),
            id_ctl: StageController::new(StageId::Decode),
            ex_ctl: StageController::new(StageId::Execute),
            mem_ctl: StageController::new(StageId::Memory),
            wb_ctl: StageController::new(StageId::WriteBack),
            pc: ProgramCounter::new(reset_pc),
            reset_pc,
            hazard_unit: HazardUnit::new(config.forwarding),
            branch_unit: BranchResolutionUnit::new(config.branch_resolution),
            verify_buses: config.verify_buses,
            regs: RegisterFile::new(),
            mem,
            decoder,
            last_tick: TickReport::default(),
            commit_trace: VecDeque::new(),
            stats: SimStats::default(),
        }
    }

    /// Returns every stage to `Empty`, clears the registers, and restarts at the reset pc.
    ///
    /// Memory contents are kept.
    pub fn reset(&mut self) {
        self.if_ctl.reset();
        self.id_ctl.reset();
        self.ex_ctl.reset();
        self.mem_ctl.reset();
        self.wb_ctl.reset();
        self.pc = ProgramCounter::new(self.reset_pc);
        self.regs = RegisterFile::new();
        self.last_tick = TickReport::default();
        self.commit_trace.clear();
        self.stats = SimStats::default();
    }

    /// Advances every stage by one clock cycle.
    ///
    /// # Returns
    ///
    /// A report of the stalls, flushes, and retirements of this tick.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MemoryFault`] when a committed-path access
    /// faults; no state has changed and the same tick can be retried. Any
    /// other [`PipelineError`] is a protocol violation found part-way through
    /// the tick, after which the core must be [`reset`](Self::reset).
    pub fn tick(&mut self) -> Result<&TickReport, PipelineError> {
        // MEM is computed before any latch moves, so a faulting access leaves
        // the core exactly as it was before the call.
        let mem_in = self.ex_ctl.pending();
        let mem_result = memory::mem_stage(&mem_in, &mut self.mem)?;

        self.stats.cycles += 1;
        let mut report = TickReport {
            cycle: self.stats.cycles,
            ..TickReport::default()
        };

        // WB: the commit record is also this tick's WB -> ID bus.
        let wb_in = self.mem_ctl.hand_off();
        let commit = *self
            .wb_ctl
            .advance(wb_in, StageControl::RUN, |p| writeback::wb_stage(&p));
        if wb_in.valid {
            report.retired_pc = Some(wb_in.pc);
            self.stats.instructions_retired += 1;
            if self.commit_trace.len() == COMMIT_TRACE_MAX {
                let _ = self.commit_trace.pop_front();
            }
            self.commit_trace.push_back(wb_in.pc);
        }

        // MEM
        self.ex_ctl.acknowledge();
        let mem_out = *self
            .mem_ctl
            .advance(mem_in, StageControl::RUN, |_| mem_result);

        // EX
        let ex_in = self.id_ctl.hand_off();
        let ex_out = *self
            .ex_ctl
            .advance(ex_in, StageControl::RUN, |p| execute::execute_stage(&p));
        self.stats.record_issue(&ex_in);
        let ex_redirect = match self.branch_unit.placement() {
            BranchResolution::Execute => self.branch_unit.resolve(&ex_in),
            BranchResolution::Decode => DecodeToFetchRedirect::default(),
        };

        let ex_fwd = execute::forward(&ex_out);
        let mem_fwd = memory::forward(&mem_out);
        let bypass =
            BypassNetwork::from_buses(&ex_fwd, &mem_fwd, &commit, self.hazard_unit.forwarding());

        // ID
        let id_in = self.if_ctl.pending();
        let decoded = if id_in.valid {
            self.decoder.decode(id_in.inst)
        } else {
            DecodedInstruction::nop()
        };
        let hazard = self.hazard_unit.detect(&decoded.sources(), &bypass);
        let id_control = StageControl {
            stall: hazard.stall(),
            flush: ex_redirect.valid && self.branch_unit.flushes(StageId::Decode),
        };
        if id_control.consumes_input() {
            self.if_ctl.acknowledge();
        }
        if id_control.flush && id_in.valid {
            report.squashed += 1;
        }
        let id_out = *self.id_ctl.try_advance(id_in, id_control, |p| {
            decode::decode_stage(&p, &decoded, &bypass, &self.regs)
        })?;
        self.id_ctl.check_control(id_control)?;

        let mut id_redirect = DecodeToFetchRedirect::default();
        let mut halt = false;
        if self.id_ctl.state() == StageState::Running && id_out.valid {
            for reg in decoded.sources() {
                if let BypassLookup::Forwarded { origin, .. } = bypass.lookup(reg) {
                    self.stats.record_forward(origin);
                }
            }
            if self.branch_unit.placement() == BranchResolution::Decode {
                id_redirect = self.branch_unit.resolve(&id_out);
            }
            halt = id_out.control == ControlKind::Halt;
        }
        if let Some(cause) = hazard.cause.filter(|_| !id_control.flush) {
            debug!("ID  pc={:#010x} stalled: {cause:?}", id_in.pc);
            self.stats.stalls_data += 1;
        }

        // IF
        let redirect = if ex_redirect.valid { ex_redirect } else { id_redirect };
        let redirect_flush = redirect.valid && self.branch_unit.flushes(StageId::Fetch);
        let if_control = StageControl {
            stall: hazard.stall(),
            flush: redirect_flush || halt,
        };
        if redirect_flush && self.pc.enabled() {
            report.squashed += 1;
        }
        debug_assert!(report.squashed as usize <= self.branch_unit.flush_depth());
        let _ = self
            .if_ctl
            .advance((), if_control, |()| fetch::fetch_stage(&mut self.pc, &mut self.mem));
        self.if_ctl.check_control(if_control)?;
        if redirect.valid {
            debug!(
                "{}  redirect to {:#010x}, squashed {}",
                self.branch_unit.stage(),
                redirect.target,
                report.squashed
            );
            self.pc.redirect(redirect.target);
            self.stats.redirects += 1;
        }
        if halt {
            debug!("ID  pc={:#010x} halt decoded; fetch disabled", id_out.pc);
            self.pc.disable();
        }
        self.stats.flushed_instructions += u64::from(report.squashed);

        // Clock edge: the single register-file write of this tick.
        writeback::retire(&commit, &mut self.regs);

        if self.verify_buses {
            self.verify(&ex_fwd, &mem_fwd, &redirect, &bypass, &decoded)?;
        }

        report.states = self.stage_states();
        report.hazard = hazard;
        report.redirect = redirect;
        report.halt_decoded = halt;
        trace!(
            "tick {} states={:?} pc={:#010x}",
            report.cycle,
            report.states,
            self.pc.pc()
        );
        self.last_tick = report;
        Ok(&self.last_tick)
    }

    /// Packs and unpacks every bus driven this tick.
    fn verify(
        &self,
        ex_fwd: &impl Packet,
        mem_fwd: &impl Packet,
        redirect: &DecodeToFetchRedirect,
        bypass: &BypassNetwork,
        decoded: &DecodedInstruction,
    ) -> Result<(), PipelineError> {
        verify_round_trip(self.if_ctl.output())?;
        verify_round_trip(self.id_ctl.output())?;
        verify_round_trip(self.ex_ctl.output())?;
        verify_round_trip(self.mem_ctl.output())?;
        verify_round_trip(self.wb_ctl.output())?;
        verify_round_trip(ex_fwd)?;
        verify_round_trip(mem_fwd)?;
        verify_round_trip(redirect)?;
        for reg in decoded.sources() {
            verify_round_trip(&bypass.resolve(reg))?;
        }
        Ok(())
    }

    /// Returns `true` once a halt has been decoded and every instruction before
    /// it has retired.
    pub fn halted(&self) -> bool {
        !self.pc.enabled()
            && !self.if_ctl.pending().valid
            && !self.id_ctl.pending().valid
            && !self.ex_ctl.pending().valid
            && !self.mem_ctl.pending().valid
    }

    /// Returns the address Fetch will read next.
    pub const fn pc(&self) -> u32 {
        self.pc.pc()
    }

    /// Returns the architectural register file.
    pub const fn regs(&self) -> &RegisterFile {
        &self.regs
    }

    /// Returns the register file for initialisation before a run.
    pub const fn regs_mut(&mut self) -> &mut RegisterFile {
        &mut self.regs
    }

    /// Returns the memory subsystem.
    pub const fn memory(&self) -> &M {
        &self.mem
    }

    /// Returns the memory subsystem mutably.
    pub const fn memory_mut(&mut self) -> &mut M {
        &mut self.mem
    }

    /// Returns the branch resolution unit.
    pub const fn branch_unit(&self) -> &BranchResolutionUnit {
        &self.branch_unit
    }

    /// Returns the state of one stage.
    pub const fn stage_state(&self, stage: StageId) -> StageState {
        match stage {
            StageId::Fetch => self.if_ctl.state(),
            StageId::Decode => self.id_ctl.state(),
            StageId::Execute => self.ex_ctl.state(),
            StageId::Memory => self.mem_ctl.state(),
            StageId::WriteBack => self.wb_ctl.state(),
        }
    }

    /// Returns every stage's state in program order.
    pub const fn stage_states(&self) -> [StageState; 5] {
        [
            self.if_ctl.state(),
            self.id_ctl.state(),
            self.ex_ctl.state(),
            self.mem_ctl.state(),
            self.wb_ctl.state(),
        ]
    }

    /// Returns the IF/ID latch.
    pub const fn if_id(&self) -> &FetchToDecodePacket {
        self.if_ctl.output()
    }

    /// Returns the ID/EX latch.
    pub const fn id_ex(&self) -> &DecodeToExecutePacket {
        self.id_ctl.output()
    }

    /// Returns the EX/MEM latch.
    pub const fn ex_mem(&self) -> &ExecuteToMemoryPacket {
        self.ex_ctl.output()
    }

    /// Returns the MEM/WB latch.
    pub const fn mem_wb(&self) -> &MemoryToWriteBackPacket {
        self.mem_ctl.output()
    }

    /// Returns the commit record produced on the last tick.
    pub const fn wb_commit(&self) -> &WriteBackToDecodeCommit {
        self.wb_ctl.output()
    }

    /// Returns the report of the last tick.
    pub const fn last_tick(&self) -> &TickReport {
        &self.last_tick
    }

    /// Returns the program counters of recently retired instructions, oldest first.
    pub fn commit_trace(&self) -> impl Iterator<Item = u32> + '_ {
        self.commit_trace.iter().copied()
    }
}

//! Simulation statistics collection and reporting.
//!
//! This module tracks performance metrics for the pipeline. It provides:
//! 1. **Cycle and IPC:** Total cycles, retired instructions, and derived metrics (IPC, CPI).
//! 2. **Instruction mix:** Counts by category (ALU, load, store, branch, jump, system).
//! 3. **Hazards:** Data-hazard stall cycles, redirects, flushed wrong-path instructions.
//! 4. **Forwarding:** Operands satisfied by each bypass source.

use std::fmt;
use std::time::Instant;

use crate::core::pipeline::bypass::ForwardOrigin;
use crate::core::pipeline::latches::DecodeToExecutePacket;
use crate::core::pipeline::signals::ControlKind;

/// Simulation statistics structure tracking all performance metrics.
#[derive(Clone, Debug)]
pub struct SimStats {
    start_time: Instant,
    /// Total simulator cycles elapsed.
    pub cycles: u64,
    /// Number of instructions committed (retired).
    pub instructions_retired: u64,

    /// Count of ALU (non-load/store/branch/system) instructions executed.
    pub inst_alu: u64,
    /// Count of load instructions executed.
    pub inst_load: u64,
    /// Count of store instructions executed.
    pub inst_store: u64,
    /// Count of conditional branches executed.
    pub inst_branch: u64,
    /// Count of jumps executed.
    pub inst_jump: u64,
    /// Count of system (halt) instructions executed.
    pub inst_system: u64,

    /// Stall cycles due to data hazards (load-use or interlock).
    pub stalls_data: u64,
    /// Number of redirects taken.
    pub redirects: u64,
    /// Wrong-path instructions discarded by flushes.
    pub flushed_instructions: u64,

    /// Operands forwarded from Execute.
    pub forwards_ex: u64,
    /// Operands forwarded from Memory.
    pub forwards_mem: u64,
    /// Operands forwarded from Write-Back.
    pub forwards_wb: u64,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            instructions_retired: 0,
            inst_alu: 0,
            inst_load: 0,
            inst_store: 0,
            inst_branch: 0,
            inst_jump: 0,
            inst_system: 0,
            stalls_data: 0,
            redirects: 0,
            flushed_instructions: 0,
            forwards_ex: 0,
            forwards_mem: 0,
            forwards_wb: 0,
        }
    }
}

/// Section names for selective stats output.
///
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "hazards", "instruction_mix"];

impl SimStats {
    /// Classifies an instruction entering Execute.
    ///
    /// Nothing downstream of Decode is ever flushed, so every instruction that
    /// reaches Execute retires.
    pub const fn record_issue(&mut self, inst: &DecodeToExecutePacket) {
        if !inst.valid {
            return;
        }
        if inst.mem_op.is_load() {
            self.inst_load += 1;
        } else if inst.mem_op.is_store() {
            self.inst_store += 1;
        } else if inst.control.is_branch() {
            self.inst_branch += 1;
        } else if inst.control.is_jump() {
            self.inst_jump += 1;
        } else if matches!(inst.control, ControlKind::Halt) {
            self.inst_system += 1;
        } else {
            self.inst_alu += 1;
        }
    }

    /// Counts one operand satisfied by the bypass network.
    pub const fn record_forward(&mut self, origin: ForwardOrigin) {
        match origin {
            ForwardOrigin::Execute => self.forwards_ex += 1,
            ForwardOrigin::Memory => self.forwards_mem += 1,
            ForwardOrigin::WriteBack => self.forwards_wb += 1,
        }
    }

    /// Instructions retired per cycle.
    pub fn ipc(&self) -> f64 {
        self.instructions_retired as f64 / self.cycles.max(1) as f64
    }

    /// Cycles per retired instruction.
    pub fn cpi(&self) -> f64 {
        self.cycles as f64 / self.instructions_retired.max(1) as f64
    }

    /// Selects statistics sections for display.
    ///
    /// # Arguments
    ///
    /// * `sections` - Section names from [`STATS_SECTIONS`], or empty for all.
    pub const fn report<'a>(&'a self, sections: &'a [String]) -> StatsReport<'a> {
        StatsReport {
            stats: self,
            sections,
        }
    }

    /// Formats the requested statistics sections.
    ///
    /// # Arguments
    ///
    /// * `sections` - Section names from [`STATS_SECTIONS`], or empty for all.
    pub fn render_sections(&self, sections: &[String]) -> String {
        self.report(sections).to_string()
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// # Arguments
    ///
    /// * `sections` - Slice of section names to print, or empty for all.
    pub fn print_sections(&self, sections: &[String]) {
        print!("{}", self.report(sections));
    }
}

/// A selection of statistics sections, formatted with `Display`.
#[derive(Clone, Copy, Debug)]
pub struct StatsReport<'a> {
    stats: &'a SimStats,
    sections: &'a [String],
}

impl StatsReport<'_> {
    fn wants(&self, section: &str) -> bool {
        self.sections.is_empty() || self.sections.iter().any(|s| s == section)
    }
}

impl fmt::Display for StatsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats;
        let seconds = stats.start_time.elapsed().as_secs_f64();
        let cyc = stats.cycles.max(1) as f64;
        let instr = stats.instructions_retired.max(1) as f64;
        let pct = |n: u64, total: f64| (n as f64 / total) * 100.0;

        if self.wants("summary") {
            let khz = (stats.cycles as f64 / seconds.max(f64::EPSILON)) / 1000.0;
            writeln!(f, "\n==========================================================")?;
            writeln!(f, "PIPELINE SIMULATION STATISTICS")?;
            writeln!(f, "==========================================================")?;
            writeln!(f, "host_seconds             {seconds:.4} s")?;
            writeln!(f, "sim_cycles               {}", stats.cycles)?;
            writeln!(f, "sim_freq                 {khz:.2} kHz")?;
            writeln!(f, "sim_insts                {}", stats.instructions_retired)?;
            writeln!(f, "sim_ipc                  {:.4}", stats.ipc())?;
            writeln!(f, "sim_cpi                  {:.4}", stats.cpi())?;
            writeln!(f, "----------------------------------------------------------")?;
        }
        if self.wants("hazards") {
            writeln!(f, "HAZARDS")?;
            writeln!(
                f,
                "  stalls.data            {} ({:.2}%)",
                stats.stalls_data,
                pct(stats.stalls_data, cyc)
            )?;
            writeln!(f, "  redirects              {}", stats.redirects)?;
            writeln!(f, "  flushed.insts          {}", stats.flushed_instructions)?;
            writeln!(f, "  forward.ex             {}", stats.forwards_ex)?;
            writeln!(f, "  forward.mem            {}", stats.forwards_mem)?;
            writeln!(f, "  forward.wb             {}", stats.forwards_wb)?;
            writeln!(f, "----------------------------------------------------------")?;
        }
        if self.wants("instruction_mix") {
            writeln!(f, "INSTRUCTION MIX")?;
            for (name, count) in [
                ("op.alu   ", stats.inst_alu),
                ("op.load  ", stats.inst_load),
                ("op.store ", stats.inst_store),
                ("op.branch", stats.inst_branch),
                ("op.jump  ", stats.inst_jump),
                ("op.system", stats.inst_system),
            ] {
                writeln!(f, "  {name}              {count} ({:.2}%)", pct(count, instr))?;
            }
            writeln!(f, "==========================================================")?;
        }
        Ok(())
    }
}

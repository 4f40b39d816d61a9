//! Branch resolution.
//!
//! Fetch always speculates the fall-through path (`pc + 4`). The branch
//! resolution unit evaluates control transfers once their operands are known
//! and, when the actual next pc differs from the fall-through, asserts a
//! redirect. Every stage between Fetch and the resolving stage is flushed; the
//! resolving stage's own instruction proceeds.
//!
//! The unit can sit in Decode (one wrong-path instruction) or Execute (two).

use crate::common::constants::INSTRUCTION_BYTES;
use crate::config::BranchResolution;
use crate::core::pipeline::controller::StageId;
use crate::core::pipeline::latches::{DecodeToExecutePacket, DecodeToFetchRedirect};
use crate::core::pipeline::signals::ControlKind;

/// Resolves control transfers and produces Fetch redirects.
#[derive(Clone, Copy, Debug)]
pub struct BranchResolutionUnit {
    placement: BranchResolution,
}

impl BranchResolutionUnit {
    /// Creates a unit resolving in the given stage.
    pub const fn new(placement: BranchResolution) -> Self {
        Self { placement }
    }

    /// Returns where transfers are resolved.
    pub const fn placement(&self) -> BranchResolution {
        self.placement
    }

    /// Returns the stage that hosts the unit.
    pub const fn stage(&self) -> StageId {
        match self.placement {
            BranchResolution::Decode => StageId::Decode,
            BranchResolution::Execute => StageId::Execute,
        }
    }

    /// Returns the number of wrong-path instructions a redirect discards.
    pub const fn flush_depth(&self) -> usize {
        match self.placement {
            BranchResolution::Decode => 1,
            BranchResolution::Execute => 2,
        }
    }

    /// Returns `true` if a redirect flushes `stage`.
    pub const fn flushes(&self, stage: StageId) -> bool {
        match stage {
            StageId::Fetch => true,
            StageId::Decode => matches!(self.placement, BranchResolution::Execute),
            StageId::Execute | StageId::Memory | StageId::WriteBack => false,
        }
    }

    /// Returns `true` if a conditional branch with these operands is taken.
    pub const fn taken(kind: ControlKind, a: u32, b: u32) -> bool {
        match kind {
            ControlKind::Beq => a == b,
            ControlKind::Bne => a != b,
            ControlKind::Blt => (a as i32) < (b as i32),
            ControlKind::Bge => (a as i32) >= (b as i32),
            ControlKind::Bltu => a < b,
            ControlKind::Bgeu => a >= b,
            ControlKind::Jal | ControlKind::Jalr => true,
            ControlKind::None | ControlKind::Halt => false,
        }
    }

    /// Computes the actual next pc of a control transfer.
    ///
    /// # Returns
    ///
    /// `None` for instructions that always fall through.
    pub const fn next_pc(inst: &DecodeToExecutePacket) -> Option<u32> {
        let fall_through = inst.pc.wrapping_add(INSTRUCTION_BYTES);
        match inst.control {
            ControlKind::Jalr => Some(inst.src1.wrapping_add(inst.imm) & !1),
            ControlKind::Jal => Some(inst.pc.wrapping_add(inst.imm)),
            kind if kind.is_branch() => {
                if Self::taken(kind, inst.src1, inst.src2) {
                    Some(inst.pc.wrapping_add(inst.imm))
                } else {
                    Some(fall_through)
                }
            }
            _ => None,
        }
    }

    /// Resolves one instruction.
    ///
    /// # Arguments
    ///
    /// * `inst` - The instruction in the resolving stage, with final operand values.
    ///
    /// # Returns
    ///
    /// A valid redirect when the actual next pc differs from the fall-through,
    /// otherwise an invalid one.
    pub fn resolve(&self, inst: &DecodeToExecutePacket) -> DecodeToFetchRedirect {
        if !inst.valid {
            return DecodeToFetchRedirect::default();
        }
        match Self::next_pc(inst) {
            Some(target) if target != inst.pc.wrapping_add(INSTRUCTION_BYTES) => {
                DecodeToFetchRedirect::to(target)
            }
            _ => DecodeToFetchRedirect::default(),
        }
    }
}

//! Per-stage controller.
//!
//! Each of the five stages is driven by a `StageController` that owns the
//! stage's output latch. Once per tick the controller either recomputes the
//! latch from its input, freezes it (stall), or replaces it with a bubble
//! (flush). The controller also implements the consumer handshake:
//! 1. **Freeze:** A stalled stage's output is preserved bit-for-bit.
//! 2. **Read Once:** A latched packet is handed to the consumer exactly once;
//!    afterwards the consumer sees a bubble until the producer latches again.
//!
//! Together these let a stalled Decode keep its frozen input while Execute
//! receives a bubble, without a separate bubble-insertion path.

use std::fmt;

use crate::common::error::PipelineError;
use crate::core::pipeline::bus::Packet;

/// Identifies a pipeline stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageId {
    /// Instruction fetch.
    Fetch,
    /// Decode and operand read.
    Decode,
    /// Execute.
    Execute,
    /// Memory access.
    Memory,
    /// Register write-back.
    WriteBack,
}

impl StageId {
    /// Every stage in program order.
    pub const ALL: [Self; 5] = [
        Self::Fetch,
        Self::Decode,
        Self::Execute,
        Self::Memory,
        Self::WriteBack,
    ];
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fetch => "IF",
            Self::Decode => "ID",
            Self::Execute => "EX",
            Self::Memory => "MEM",
            Self::WriteBack => "WB",
        };
        f.write_str(name)
    }
}

/// State of a stage after its most recent tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StageState {
    /// Reset; nothing latched yet.
    #[default]
    Empty,
    /// Latched a newly computed packet.
    Running,
    /// Held its previous packet.
    Stalled,
    /// Latched a bubble in place of its work.
    Flushed,
}

impl fmt::Display for StageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Empty => "EMPTY",
            Self::Running => "RUNNING",
            Self::Stalled => "STALLED",
            Self::Flushed => "FLUSHED",
        };
        f.write_str(name)
    }
}

/// Stall and flush inputs for one stage on one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StageControl {
    /// Hold the current output and leave the input unconsumed.
    pub stall: bool,
    /// Discard the stage's work and latch a bubble. Dominates `stall`.
    pub flush: bool,
}

impl StageControl {
    /// Advance normally.
    pub const RUN: Self = Self {
        stall: false,
        flush: false,
    };

    /// Returns `true` when the stage will consume its input this tick.
    pub const fn consumes_input(self) -> bool {
        self.flush || !self.stall
    }
}

/// Drives one stage's output latch.
#[derive(Clone, Debug)]
pub struct StageController<P: Packet> {
    stage: StageId,
    output: P,
    state: StageState,
    delivered: bool,
}

impl<P: Packet> StageController<P> {
    /// Creates a controller in the `Empty` state with a bubble latched.
    pub fn new(stage: StageId) -> Self {
        Self {
            stage,
            output: P::bubble(),
            state: StageState::Empty,
            delivered: false,
        }
    }

    /// Returns the stage this controller drives.
    pub const fn stage(&self) -> StageId {
        self.stage
    }

    /// Returns the state reached on the last tick.
    pub const fn state(&self) -> StageState {
        self.state
    }

    /// Returns the latched output, whether or not it has been delivered.
    pub const fn output(&self) -> &P {
        &self.output
    }

    /// Returns the packet the consumer sees this tick: the latched output, or a
    /// bubble if it was already handed over.
    pub fn pending(&self) -> P {
        if self.delivered {
            P::bubble()
        } else {
            self.output
        }
    }

    /// Marks the latched output as consumed.
    pub const fn acknowledge(&mut self) {
        self.delivered = true;
    }

    /// Returns the pending packet and marks it consumed.
    pub fn hand_off(&mut self) -> P {
        let packet = self.pending();
        self.acknowledge();
        packet
    }

    /// Advances the stage by one tick with a fallible compute function.
    ///
    /// Flush latches a bubble regardless of stall. Stall leaves the output and
    /// its delivery state untouched. Otherwise `compute` produces the new output.
    ///
    /// # Arguments
    ///
    /// * `input` - Packet from the upstream stage; dropped unless computed.
    /// * `control` - Stall and flush for this tick.
    /// * `compute` - The stage's combinational logic.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `compute`; the latch is unchanged.
    pub fn try_advance<I, E>(
        &mut self,
        input: I,
        control: StageControl,
        compute: impl FnOnce(I) -> Result<P, E>,
    ) -> Result<&P, E> {
        if control.flush {
            self.output = P::bubble();
            self.state = StageState::Flushed;
            self.delivered = false;
        } else if control.stall {
            self.state = StageState::Stalled;
        } else {
            self.output = compute(input)?;
            self.state = StageState::Running;
            self.delivered = false;
        }
        Ok(&self.output)
    }

    /// Advances the stage by one tick with an infallible compute function.
    ///
    /// See [`StageController::try_advance`].
    pub fn advance<I>(&mut self, input: I, control: StageControl, compute: impl FnOnce(I) -> P) -> &P {
        match self.try_advance::<I, std::convert::Infallible>(input, control, |i| Ok(compute(i))) {
            Ok(output) => output,
            Err(never) => match never {},
        }
    }

    /// Checks that a tick given both stall and flush ended flushed.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::FlushStallConflict`] otherwise.
    pub fn check_control(&self, control: StageControl) -> Result<(), PipelineError> {
        if control.stall && control.flush && self.state != StageState::Flushed {
            return Err(PipelineError::FlushStallConflict {
                stage: self.stage,
                state: self.state,
            });
        }
        Ok(())
    }

    /// Returns the controller to its reset state.
    pub fn reset(&mut self) {
        self.output = P::bubble();
        self.state = StageState::Empty;
        self.delivered = false;
    }
}

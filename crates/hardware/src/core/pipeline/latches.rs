//! Inter-stage packets.
//!
//! This module defines the payload carried on each of the pipeline's buses.
//! Every packet has a `valid` flag; a packet with `valid == false` is a bubble.
//! 1. **Forward Buses:** Fetch → Decode → Execute → Memory → Write-Back.
//! 2. **Feedback Buses:** Forwarding from Execute and Memory, the Write-Back
//!    commit record, and the Decode → Fetch redirect.
//! 3. **Bypass:** The per-operand signal produced by the bypass network.
//!
//! Layouts are listed least significant field first and must fill the
//! declared bus width exactly.

use crate::common::constants::INSTRUCTION_BYTES;
use crate::common::error::PipelineError;
use crate::common::reg::RegId;
use crate::core::pipeline::bus::{BusKind, BusReader, BusWord, BusWriter, Packet};
use crate::core::pipeline::signals::{AccessSize, AluOp, ControlKind, MemOp};

/// Fetch → Decode packet (65 bits: inst 32, pc 32, valid 1).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FetchToDecodePacket {
    /// Slot holds an instruction.
    pub valid: bool,
    /// Address the instruction was fetched from.
    pub pc: u32,
    /// Raw instruction word.
    pub inst: u32,
}

impl FetchToDecodePacket {
    /// Address Fetch speculated would follow this instruction.
    pub const fn fall_through(&self) -> u32 {
        self.pc.wrapping_add(INSTRUCTION_BYTES)
    }
}

impl Packet for FetchToDecodePacket {
    const BUS: BusKind = BusKind::FetchToDecode;

    fn bubble() -> Self {
        Self::default()
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn pack(&self) -> Result<BusWord, PipelineError> {
        Ok(BusWriter::new(Self::BUS)
            .word("inst", self.inst)?
            .word("pc", self.pc)?
            .flag("valid", self.valid)?
            .finish())
    }

    fn unpack(word: BusWord) -> Result<Self, PipelineError> {
        let mut r = BusReader::new(Self::BUS, word)?;
        let inst = r.word();
        let pc = r.word();
        let valid = r.flag();
        Ok(Self { valid, pc, inst })
    }
}

/// Decode → Execute packet (156 bits).
///
/// Layout: valid 1, pc 32, src1 32, src2 32, imm 32, dest 5, src1_id 5,
/// src2_id 5, alu_op 4, control 4, mem_op 2, size 2.
///
/// `src1` and `src2` are the operand values after the bypass network and the
/// operand multiplexers; `src1_id` and `src2_id` name the registers they were
/// read from (`r0` when the operand is not a register). `dest` is `r0` for
/// instructions that do not write a register.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeToExecutePacket {
    /// Slot holds an instruction.
    pub valid: bool,
    /// Instruction address.
    pub pc: u32,
    /// First operand value.
    pub src1: u32,
    /// Second operand value; store data for stores.
    pub src2: u32,
    /// Sign-extended immediate.
    pub imm: u32,
    /// Destination register, `r0` for none.
    pub dest: RegId,
    /// Register the first operand was read from.
    pub src1_id: RegId,
    /// Register the second operand was read from.
    pub src2_id: RegId,
    /// Arithmetic operation.
    pub alu_op: AluOp,
    /// Control-transfer class.
    pub control: ControlKind,
    /// Memory operation.
    pub mem_op: MemOp,
    /// Memory access size.
    pub size: AccessSize,
}

impl Packet for DecodeToExecutePacket {
    const BUS: BusKind = BusKind::DecodeToExecute;

    fn bubble() -> Self {
        Self::default()
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn pack(&self) -> Result<BusWord, PipelineError> {
        Ok(BusWriter::new(Self::BUS)
            .flag("valid", self.valid)?
            .word("pc", self.pc)?
            .word("src1", self.src1)?
            .word("src2", self.src2)?
            .word("imm", self.imm)?
            .reg("dest", self.dest)?
            .reg("src1_id", self.src1_id)?
            .reg("src2_id", self.src2_id)?
            .field("alu_op", self.alu_op.bits(), AluOp::WIDTH)?
            .field("control", self.control.bits(), ControlKind::WIDTH)?
            .field("mem_op", self.mem_op.bits(), MemOp::WIDTH)?
            .field("size", self.size.bits(), AccessSize::WIDTH)?
            .finish())
    }

    fn unpack(word: BusWord) -> Result<Self, PipelineError> {
        let mut r = BusReader::new(Self::BUS, word)?;
        Ok(Self {
            valid: r.flag(),
            pc: r.word(),
            src1: r.word(),
            src2: r.word(),
            imm: r.word(),
            dest: r.reg(),
            src1_id: r.reg(),
            src2_id: r.reg(),
            alu_op: r.code("alu_op", AluOp::WIDTH, AluOp::from_bits)?,
            control: r.code("control", ControlKind::WIDTH, ControlKind::from_bits)?,
            mem_op: r.code("mem_op", MemOp::WIDTH, MemOp::from_bits)?,
            size: r.code("size", AccessSize::WIDTH, AccessSize::from_bits)?,
        })
    }
}

/// Execute → Memory packet (110 bits).
///
/// Layout: valid 1, pc 32, result 32, store_data 32, dest 5, mem_op 2,
/// byte_enable 4, size 2.
///
/// For memory operations `result` is the effective address and `store_data`
/// is already shifted into the byte lanes selected by `byte_enable`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecuteToMemoryPacket {
    /// Slot holds an instruction.
    pub valid: bool,
    /// Instruction address.
    pub pc: u32,
    /// ALU result, link address, or effective address.
    pub result: u32,
    /// Lane-aligned store data.
    pub store_data: u32,
    /// Destination register, `r0` for none.
    pub dest: RegId,
    /// Memory operation.
    pub mem_op: MemOp,
    /// Byte lanes touched within the aligned word.
    pub byte_enable: u8,
    /// Memory access size.
    pub size: AccessSize,
}

impl Packet for ExecuteToMemoryPacket {
    const BUS: BusKind = BusKind::ExecuteToMemory;

    fn bubble() -> Self {
        Self::default()
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn pack(&self) -> Result<BusWord, PipelineError> {
        Ok(BusWriter::new(Self::BUS)
            .flag("valid", self.valid)?
            .word("pc", self.pc)?
            .word("result", self.result)?
            .word("store_data", self.store_data)?
            .reg("dest", self.dest)?
            .field("mem_op", self.mem_op.bits(), MemOp::WIDTH)?
            .field("byte_enable", u64::from(self.byte_enable), 4)?
            .field("size", self.size.bits(), AccessSize::WIDTH)?
            .finish())
    }

    fn unpack(word: BusWord) -> Result<Self, PipelineError> {
        let mut r = BusReader::new(Self::BUS, word)?;
        Ok(Self {
            valid: r.flag(),
            pc: r.word(),
            result: r.word(),
            store_data: r.word(),
            dest: r.reg(),
            mem_op: r.code("mem_op", MemOp::WIDTH, MemOp::from_bits)?,
            byte_enable: r.field(4) as u8,
            size: r.code("size", AccessSize::WIDTH, AccessSize::from_bits)?,
        })
    }
}

/// Memory → Write-Back packet (70 bits: valid 1, dest 5, value 32, pc 32).
///
/// There is no separate write-enable bit; `dest == r0` means "no write".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemoryToWriteBackPacket {
    /// Slot holds an instruction.
    pub valid: bool,
    /// Destination register, `r0` for none.
    pub dest: RegId,
    /// Value to commit.
    pub value: u32,
    /// Instruction address.
    pub pc: u32,
}

impl MemoryToWriteBackPacket {
    /// Returns `true` when the packet updates the register file.
    pub const fn write_enable(&self) -> bool {
        self.valid && !self.dest.is_zero()
    }
}

impl Packet for MemoryToWriteBackPacket {
    const BUS: BusKind = BusKind::MemoryToWriteBack;

    fn bubble() -> Self {
        Self::default()
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn pack(&self) -> Result<BusWord, PipelineError> {
        Ok(BusWriter::new(Self::BUS)
            .flag("valid", self.valid)?
            .reg("dest", self.dest)?
            .word("value", self.value)?
            .word("pc", self.pc)?
            .finish())
    }

    fn unpack(word: BusWord) -> Result<Self, PipelineError> {
        let mut r = BusReader::new(Self::BUS, word)?;
        Ok(Self {
            valid: r.flag(),
            dest: r.reg(),
            value: r.word(),
            pc: r.word(),
        })
    }
}

/// Defines a 40-bit forwarding packet (valid 1, write_enable 1, load_pending 1,
/// dest 5, value 32) travelling on `$bus`.
macro_rules! forward_packet {
    ($(#[$meta:meta])* $name:ident, $bus:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        pub struct $name {
            /// Slot holds an instruction.
            pub valid: bool,
            /// The instruction writes `dest`.
            pub write_enable: bool,
            /// `value` is not produced yet (a load still in flight).
            pub load_pending: bool,
            /// Destination register.
            pub dest: RegId,
            /// Result to forward.
            pub value: u32,
        }

        impl Packet for $name {
            const BUS: BusKind = $bus;

            fn bubble() -> Self {
                Self::default()
            }

            fn is_valid(&self) -> bool {
                self.valid
            }

            fn pack(&self) -> Result<BusWord, PipelineError> {
                Ok(BusWriter::new(Self::BUS)
                    .flag("valid", self.valid)?
                    .flag("write_enable", self.write_enable)?
                    .flag("load_pending", self.load_pending)?
                    .reg("dest", self.dest)?
                    .word("value", self.value)?
                    .finish())
            }

            fn unpack(word: BusWord) -> Result<Self, PipelineError> {
                let mut r = BusReader::new(Self::BUS, word)?;
                Ok(Self {
                    valid: r.flag(),
                    write_enable: r.flag(),
                    load_pending: r.flag(),
                    dest: r.reg(),
                    value: r.word(),
                })
            }
        }
    };
}

forward_packet!(
    /// Execute → Decode forwarding packet (40 bits).
    ExecuteToDecodeForward,
    BusKind::ExecuteToDecode
);

forward_packet!(
    /// Memory → Decode forwarding packet (40 bits).
    ///
    /// `load_pending` is always clear: loaded data is available once Memory completes.
    MemoryToDecodeForward,
    BusKind::MemoryToDecode
);

/// Write-Back → Decode commit record (39 bits: valid 1, write_enable 1, dest 5, value 32).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriteBackToDecodeCommit {
    /// An instruction retired this tick.
    pub valid: bool,
    /// The retiring instruction writes `dest`.
    pub write_enable: bool,
    /// Destination register.
    pub dest: RegId,
    /// Value committed.
    pub value: u32,
}

impl Packet for WriteBackToDecodeCommit {
    const BUS: BusKind = BusKind::WriteBackToDecode;

    fn bubble() -> Self {
        Self::default()
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn pack(&self) -> Result<BusWord, PipelineError> {
        Ok(BusWriter::new(Self::BUS)
            .flag("valid", self.valid)?
            .flag("write_enable", self.write_enable)?
            .reg("dest", self.dest)?
            .word("value", self.value)?
            .finish())
    }

    fn unpack(word: BusWord) -> Result<Self, PipelineError> {
        let mut r = BusReader::new(Self::BUS, word)?;
        Ok(Self {
            valid: r.flag(),
            write_enable: r.flag(),
            dest: r.reg(),
            value: r.word(),
        })
    }
}

/// Decode → Fetch redirect (33 bits: valid 1, target 32).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeToFetchRedirect {
    /// Fetch must discard its speculative work and continue at `target`.
    pub valid: bool,
    /// Corrected next pc.
    pub target: u32,
}

impl DecodeToFetchRedirect {
    /// Returns an asserted redirect to `target`.
    pub const fn to(target: u32) -> Self {
        Self {
            valid: true,
            target,
        }
    }
}

impl Packet for DecodeToFetchRedirect {
    const BUS: BusKind = BusKind::DecodeToFetch;

    fn bubble() -> Self {
        Self::default()
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn pack(&self) -> Result<BusWord, PipelineError> {
        Ok(BusWriter::new(Self::BUS)
            .flag("valid", self.valid)?
            .word("target", self.target)?
            .finish())
    }

    fn unpack(word: BusWord) -> Result<Self, PipelineError> {
        let mut r = BusReader::new(Self::BUS, word)?;
        Ok(Self {
            valid: r.flag(),
            target: r.word(),
        })
    }
}

/// Bypass signal for one operand (38 bits: valid 1, reg 5, value 32).
///
/// `valid == false` means "use the register-file value".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BypassSignal {
    /// A forwarded value overrides the register file.
    pub valid: bool,
    /// Register being resolved.
    pub reg: RegId,
    /// Forwarded value.
    pub value: u32,
}

impl BypassSignal {
    /// Signal telling Decode to read `reg` from the register file.
    pub const fn register_file(reg: RegId) -> Self {
        Self {
            valid: false,
            reg,
            value: 0,
        }
    }
}

impl Packet for BypassSignal {
    const BUS: BusKind = BusKind::Bypass;

    fn bubble() -> Self {
        Self::default()
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn pack(&self) -> Result<BusWord, PipelineError> {
        Ok(BusWriter::new(Self::BUS)
            .flag("valid", self.valid)?
            .reg("reg", self.reg)?
            .word("value", self.value)?
            .finish())
    }

    fn unpack(word: BusWord) -> Result<Self, PipelineError> {
        let mut r = BusReader::new(Self::BUS, word)?;
        Ok(Self {
            valid: r.flag(),
            reg: r.reg(),
            value: r.word(),
        })
    }
}

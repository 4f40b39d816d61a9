//! RISC-V Instruction Decoder.
//!
//! This module turns 32-bit instruction words into the control signals Decode
//! latches onto the Decode → Execute bus. It provides:
//! 1. **Decoder Interface:** The `InstructionDecoder` trait the pipeline depends on.
//! 2. **Decoded Form:** `DecodedInstruction`, the signal bundle plus operand routing.
//! 3. **RV32I Subset:** `Rv32Decoder`, the default implementation.
//!
//! Unrecognised encodings decode as no-ops so speculative fetches of data or
//! unmapped memory never disturb the pipeline.

use tracing::warn;

use crate::common::reg::RegId;
use crate::core::pipeline::signals::{AccessSize, AluOp, ControlKind, MemOp};
use crate::isa::instruction::InstructionBits;
use crate::isa::rv32i::{funct3, funct7, opcodes};

/// Source of the first ALU operand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OperandA {
    /// Value of `rs1`.
    #[default]
    Register,
    /// The instruction's own pc (AUIPC).
    Pc,
    /// Constant zero (LUI).
    Zero,
}

/// Source of the second ALU operand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OperandB {
    /// Value of `rs2`.
    #[default]
    Register,
    /// The sign-extended immediate.
    Immediate,
}

/// Control signals and operand routing for one instruction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodedInstruction {
    /// Arithmetic operation.
    pub alu_op: AluOp,
    /// Control-transfer class.
    pub control: ControlKind,
    /// Memory operation.
    pub mem_op: MemOp,
    /// Memory access size.
    pub size: AccessSize,
    /// Destination register, `r0` for none.
    pub dest: RegId,
    /// First source register, `r0` for none.
    pub rs1: RegId,
    /// Second source register, `r0` for none.
    pub rs2: RegId,
    /// Sign-extended immediate.
    pub imm: u32,
    /// First operand mux.
    pub operand_a: OperandA,
    /// Second operand mux.
    pub operand_b: OperandB,
}

impl DecodedInstruction {
    /// An instruction with no effect.
    pub fn nop() -> Self {
        Self::default()
    }

    /// Returns the registers the instruction reads, `r0` for unused slots.
    pub const fn sources(&self) -> [RegId; 2] {
        [self.rs1, self.rs2]
    }
}

/// Maps instruction words to control signals.
pub trait InstructionDecoder {
    /// Decodes one instruction word. Unknown encodings must decode as no-ops.
    fn decode(&self, inst: u32) -> DecodedInstruction;
}

/// Decoder for the RV32I subset.
#[derive(Clone, Copy, Debug, Default)]
pub struct Rv32Decoder;

impl Rv32Decoder {
    fn alu_op(f3: u32, alt: bool, register_form: bool) -> AluOp {
        match f3 {
            funct3::ADD_SUB if alt && register_form => AluOp::Sub,
            funct3::ADD_SUB => AluOp::Add,
            funct3::SLL => AluOp::Sll,
            funct3::SLT => AluOp::Slt,
            funct3::SLTU => AluOp::Sltu,
            funct3::XOR => AluOp::Xor,
            funct3::SRL_SRA if alt => AluOp::Sra,
            funct3::SRL_SRA => AluOp::Srl,
            funct3::OR => AluOp::Or,
            _ => AluOp::And,
        }
    }

    fn branch_kind(f3: u32) -> Option<ControlKind> {
        match f3 {
            funct3::BEQ => Some(ControlKind::Beq),
            funct3::BNE => Some(ControlKind::Bne),
            funct3::BLT => Some(ControlKind::Blt),
            funct3::BGE => Some(ControlKind::Bge),
            funct3::BLTU => Some(ControlKind::Bltu),
            funct3::BGEU => Some(ControlKind::Bgeu),
            _ => None,
        }
    }

    fn load(f3: u32) -> Option<(MemOp, AccessSize)> {
        match f3 {
            funct3::LB => Some((MemOp::Load, AccessSize::Byte)),
            funct3::LH => Some((MemOp::Load, AccessSize::Half)),
            funct3::LW => Some((MemOp::Load, AccessSize::Word)),
            funct3::LBU => Some((MemOp::LoadUnsigned, AccessSize::Byte)),
            funct3::LHU => Some((MemOp::LoadUnsigned, AccessSize::Half)),
            _ => None,
        }
    }

    fn store(f3: u32) -> Option<AccessSize> {
        match f3 {
            funct3::SB => Some(AccessSize::Byte),
            funct3::SH => Some(AccessSize::Half),
            funct3::SW => Some(AccessSize::Word),
            _ => None,
        }
    }

    fn try_decode(inst: u32) -> Option<DecodedInstruction> {
        let f3 = inst.funct3();
        let base = DecodedInstruction::nop();
        let decoded = match inst.opcode() {
            opcodes::OP_LUI => DecodedInstruction {
                dest: inst.rd(),
                imm: inst.imm_u(),
                operand_a: OperandA::Zero,
                operand_b: OperandB::Immediate,
                ..base
            },
            opcodes::OP_AUIPC => DecodedInstruction {
                dest: inst.rd(),
                imm: inst.imm_u(),
                operand_a: OperandA::Pc,
                operand_b: OperandB::Immediate,
                ..base
            },
            opcodes::OP_JAL => DecodedInstruction {
                control: ControlKind::Jal,
                dest: inst.rd(),
                imm: inst.imm_j(),
                ..base
            },
            opcodes::OP_JALR if f3 == 0 => DecodedInstruction {
                control: ControlKind::Jalr,
                dest: inst.rd(),
                rs1: inst.rs1(),
                imm: inst.imm_i(),
                ..base
            },
            opcodes::OP_BRANCH => DecodedInstruction {
                control: Self::branch_kind(f3)?,
                rs1: inst.rs1(),
                rs2: inst.rs2(),
                imm: inst.imm_b(),
                ..base
            },
            opcodes::OP_LOAD => {
                let (mem_op, size) = Self::load(f3)?;
                DecodedInstruction {
                    mem_op,
                    size,
                    dest: inst.rd(),
                    rs1: inst.rs1(),
                    imm: inst.imm_i(),
                    ..base
                }
            }
            opcodes::OP_STORE => DecodedInstruction {
                mem_op: MemOp::Store,
                size: Self::store(f3)?,
                rs1: inst.rs1(),
                rs2: inst.rs2(),
                imm: inst.imm_s(),
                ..base
            },
            opcodes::OP_IMM => {
                let shift = matches!(f3, funct3::SLL | funct3::SRL_SRA);
                let alt = shift && inst.funct7() == funct7::SUB_SRA;
                let imm = if shift { inst.imm_i() & 0x1f } else { inst.imm_i() };
                DecodedInstruction {
                    alu_op: Self::alu_op(f3, alt, false),
                    dest: inst.rd(),
                    rs1: inst.rs1(),
                    imm,
                    operand_b: OperandB::Immediate,
                    ..base
                }
            }
            opcodes::OP_REG => {
                let f7 = inst.funct7();
                if f7 != funct7::DEFAULT && f7 != funct7::SUB_SRA {
                    return None;
                }
                DecodedInstruction {
                    alu_op: Self::alu_op(f3, f7 == funct7::SUB_SRA, true),
                    dest: inst.rd(),
                    rs1: inst.rs1(),
                    rs2: inst.rs2(),
                    ..base
                }
            }
            opcodes::OP_SYSTEM if inst == opcodes::ECALL || inst == opcodes::EBREAK => {
                DecodedInstruction {
                    control: ControlKind::Halt,
                    ..base
                }
            }
            opcodes::OP_MISC_MEM => base,
            _ => return None,
        };
        Some(decoded)
    }
}

impl InstructionDecoder for Rv32Decoder {
    fn decode(&self, inst: u32) -> DecodedInstruction {
        Self::try_decode(inst).unwrap_or_else(|| {
            if inst != 0 {
                warn!("undecodable instruction {inst:#010x}; treating as nop");
            }
            DecodedInstruction::nop()
        })
    }
}

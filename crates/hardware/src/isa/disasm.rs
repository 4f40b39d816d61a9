//! Instruction Disassembler for the RV32I subset.
//!
//! Converts a 32-bit instruction encoding into a mnemonic string for stage
//! trace lines and test diagnostics. Unrecognised words render as `.word`.
//!
//! ```
//! use pipesim_core::isa::disasm::disassemble;
//! assert_eq!(disassemble(0x00a0_0513), "addi a0, zero, 10");
//! ```

use crate::common::reg::RegId;
use crate::isa::instruction::InstructionBits;
use crate::isa::rv32i::{funct3, funct7, opcodes};

/// ABI register names for x0–x31.
const REG_NAMES: [&str; 32] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

/// Returns the ABI name for a register.
#[inline]
pub fn reg_name(reg: RegId) -> &'static str {
    REG_NAMES.get(reg.index()).copied().unwrap_or("x??")
}

/// Disassembles one instruction word.
pub fn disassemble(inst: u32) -> String {
    let rd = reg_name(inst.rd());
    let rs1 = reg_name(inst.rs1());
    let rs2 = reg_name(inst.rs2());
    let f3 = inst.funct3();
    let alt = inst.funct7() == funct7::SUB_SRA;

    match inst.opcode() {
        opcodes::OP_LUI => format!("lui {rd}, {:#x}", inst.imm_u() >> 12),
        opcodes::OP_AUIPC => format!("auipc {rd}, {:#x}", inst.imm_u() >> 12),
        opcodes::OP_JAL => format!("jal {rd}, {}", inst.imm_j() as i32),
        opcodes::OP_JALR => format!("jalr {rd}, {}({rs1})", inst.imm_i() as i32),
        opcodes::OP_BRANCH => {
            let name = match f3 {
                funct3::BEQ => "beq",
                funct3::BNE => "bne",
                funct3::BLT => "blt",
                funct3::BGE => "bge",
                funct3::BLTU => "bltu",
                funct3::BGEU => "bgeu",
                _ => return format!(".word {inst:#010x}"),
            };
            format!("{name} {rs1}, {rs2}, {}", inst.imm_b() as i32)
        }
        opcodes::OP_LOAD => {
            let name = match f3 {
                funct3::LB => "lb",
                funct3::LH => "lh",
                funct3::LW => "lw",
                funct3::LBU => "lbu",
                funct3::LHU => "lhu",
                _ => return format!(".word {inst:#010x}"),
            };
            format!("{name} {rd}, {}({rs1})", inst.imm_i() as i32)
        }
        opcodes::OP_STORE => {
            let name = match f3 {
                funct3::SB => "sb",
                funct3::SH => "sh",
                funct3::SW => "sw",
                _ => return format!(".word {inst:#010x}"),
            };
            format!("{name} {rs2}, {}({rs1})", inst.imm_s() as i32)
        }
        opcodes::OP_IMM => {
            if inst == opcodes::NOP {
                return "nop".to_string();
            }
            let name = match f3 {
                funct3::ADD_SUB => "addi",
                funct3::SLL => "slli",
                funct3::SLT => "slti",
                funct3::SLTU => "sltiu",
                funct3::XOR => "xori",
                funct3::SRL_SRA if alt => "srai",
                funct3::SRL_SRA => "srli",
                funct3::OR => "ori",
                _ => "andi",
            };
            let imm = if matches!(f3, funct3::SLL | funct3::SRL_SRA) {
                (inst.imm_i() & 0x1f) as i32
            } else {
                inst.imm_i() as i32
            };
            format!("{name} {rd}, {rs1}, {imm}")
        }
        opcodes::OP_REG => {
            let name = match f3 {
                funct3::ADD_SUB if alt => "sub",
                funct3::ADD_SUB => "add",
                funct3::SLL => "sll",
                funct3::SLT => "slt",
                funct3::SLTU => "sltu",
                funct3::XOR => "xor",
                funct3::SRL_SRA if alt => "sra",
                funct3::SRL_SRA => "srl",
                funct3::OR => "or",
                _ => "and",
            };
            format!("{name} {rd}, {rs1}, {rs2}")
        }
        opcodes::OP_SYSTEM if inst == opcodes::ECALL => "ecall".to_string(),
        opcodes::OP_SYSTEM if inst == opcodes::EBREAK => "ebreak".to_string(),
        opcodes::OP_MISC_MEM => "fence".to_string(),
        _ => format!(".word {inst:#010x}"),
    }
}

//! ALU logical and comparison operations.

use crate::core::pipeline::signals::AluOp;

/// Executes a bitwise or set-less-than operation.
///
/// # Returns
///
/// The bitwise result, or `1`/`0` for comparisons. Returns `0` for other opcodes.
pub const fn execute(op: AluOp, a: u32, b: u32) -> u32 {
    match op {
        AluOp::Or => a | b,
        AluOp::And => a & b,
        AluOp::Xor => a ^ b,
        AluOp::Slt => ((a as i32) < (b as i32)) as u32,
        AluOp::Sltu => (a < b) as u32,
        _ => 0,
    }
}

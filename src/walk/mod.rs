// The opcode dispatch tables shared by the census and the stack tracer.
pub mod opcodes;
// Only contains InstrWalker and its instruction type, so re-export here.
mod walker;

pub use opcodes::{is_structural, Immediates, OpInfo, StackEffect};
pub use walker::{Imm, Instr, InstrWalker};

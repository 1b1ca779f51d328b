//! Assembler and interpreter for a minimal single-accumulator bytecode
//! machine: four opcodes, a variable-width binary encoding, a flat 64K-cell
//! memory, and a post-execution memory snapshot.

#[macro_use]
extern crate prettytable;
#[macro_use]
extern crate lazy_static;

pub mod bytecode;
pub mod errors;
pub mod machine;

pub use crate::bytecode::{assemble, disassemble, Instruction, Operation};
pub use crate::errors::VmError;
pub use crate::machine::{Machine, MemorySnapshot, MEMORY_SIZE};

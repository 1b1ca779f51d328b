//! Error kinds raised while assembling, encoding, decoding, or executing a
//! program. All of them are terminal for the operation in progress: the
//! assembler aborts on the first invalid row, the machine on the first
//! malformed instruction or invalid access.

use thiserror::Error;

use crate::bytecode::Operation;

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum VmError {
  /// The low seven bits of an instruction's first byte name no operation.
  #[error("unknown opcode {value} at byte offset {offset}")]
  UnknownOpcode { value: u8, offset: usize },

  /// A listing row names no operation.
  #[error("line {line}: unknown mnemonic `{name}`")]
  UnknownMnemonic { name: String, line: usize },

  /// An operand exceeds the opcode's encode-time bound.
  #[error("{opcode} operand {value} out of range (0..={max})")]
  OperandOutOfRange {
    opcode: Operation,
    value: u64,
    max: u64,
  },

  /// The buffer ends before the instruction does.
  #[error(
    "truncated {opcode} instruction at byte offset {offset}: \
     {needed} bytes needed, {available} available"
  )]
  TruncatedInstruction {
    opcode: Operation,
    offset: usize,
    needed: usize,
    available: usize,
  },

  /// An executed instruction touched an address outside memory.
  #[error("{opcode} address {address} outside memory (0..={limit})")]
  MemoryOutOfRange {
    opcode: Operation,
    address: u64,
    limit: u64,
  },

  /// A listing row omits the operand its opcode requires.
  #[error("line {line}: {opcode} requires an operand")]
  MissingOperand { opcode: Operation, line: usize },

  /// A listing row supplies an operand its opcode does not take.
  #[error("line {line}: {opcode} takes no operand")]
  UnexpectedOperand { opcode: Operation, line: usize },

  /// A listing row does not fit the `opcode,operand` shape.
  #[error("line {line}: malformed row `{content}`")]
  MalformedRow { line: usize, content: String },
}

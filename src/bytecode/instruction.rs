use std::fmt::{Display, Formatter};

use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display as StrumDisplay, EnumString, IntoStaticStr};

/**
  Opcodes of the machine.

  The discriminants are the wire identifiers: each occupies the low seven
  bits of an instruction's first byte. They are arbitrary but fixed, and
  globally unique across the instruction set, so decoding dispatches on the
  masked first byte alone. The `strum` derives give the textual mnemonics
  used by the assembler; `num_enum` gives the byte-to-variant conversion
  used by the decoder.
*/
#[derive(
StrumDisplay, IntoStaticStr, EnumString, TryFromPrimitive, IntoPrimitive,
Clone,        Copy,          Eq, PartialEq,  Debug,            Hash
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Operation {
  /// accumulator <- operand
  Load  = 57,
  /// accumulator <- memory[accumulator]
  Read  = 102,
  /// memory[operand] <- accumulator
  Write = 112,
  /// accumulator <- accumulator with its four bytes reversed
  Bswap = 5,
}

impl Operation {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  pub fn takes_operand(&self) -> bool {
    match self {
      Operation::Load | Operation::Write => true,
      Operation::Read | Operation::Bswap => false,
    }
  }
}

/// Holds the unencoded components of an instruction, one variant per opcode.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Instruction {
  /// [Reserved:2][Operand:31][Opcode:7], five bytes little-endian
  Load(u32),
  /// [Opcode:7], one byte
  Read,
  /// [Reserved:4][Operand:13][Opcode:7], three bytes little-endian
  Write(u16),
  /// [Opcode:7], one byte
  Bswap,
}

impl Instruction {
  pub fn opcode(&self) -> Operation {
    match self {
      Instruction::Load(_)  => Operation::Load,
      Instruction::Read     => Operation::Read,
      Instruction::Write(_) => Operation::Write,
      Instruction::Bswap    => Operation::Bswap,
    }
  }

  pub fn operand(&self) -> Option<u64> {
    match self {
      Instruction::Load(value)    => Some(*value as u64),
      Instruction::Write(address) => Some(*address as u64),
      Instruction::Read | Instruction::Bswap => None,
    }
  }
}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.operand() {
      Some(operand) => write!(f, "{} {}", self.opcode(), operand),
      None          => write!(f, "{}", self.opcode()),
    }
  }
}

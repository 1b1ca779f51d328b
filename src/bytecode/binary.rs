/*!
  This module is responsible for the encoding and decoding of binary
  instructions, and for the encode-time operand bounds.

  The operand bounds checked here are deliberately narrower than the
  structural field widths for `WRITE`: the assembler accepts 12 bits
  (0..=4095) while the wire field holds 13 (mask `0x1FFF`). Both limits are
  part of the observed format and are kept as-is rather than unified.
*/

use super::{Instruction, Operation};
use crate::errors::VmError;

/// Width of the accumulator and of one memory cell.
pub type Word = u32;

/// Bits occupied by the opcode at the bottom of every instruction.
pub const OPCODE_BITS: u32 = 7;
pub const OPCODE_MASK: u8 = 0x7F;

/// Encode-time operand bound for `LOAD`: 31 bits.
pub const LOAD_OPERAND_MAX: u64 = (1 << 31) - 1;
/// Encode-time operand bound for `WRITE`: 12 bits.
pub const WRITE_OPERAND_MAX: u64 = (1 << 12) - 1;
/// Structural width of the `WRITE` operand field: 13 bits.
pub const WRITE_FIELD_MASK: u64 = 0x1FFF;

/// Returns the size in bytes of an instruction for the corresponding opcode.
pub fn instruction_size(opcode: Operation) -> usize {
  match opcode {
    Operation::Load                    => 5,
    Operation::Write                   => 3,
    Operation::Read | Operation::Bswap => 1,
  }
}

/// Enforces the declared operand bounds. Applied when encoding, never when
/// decoding.
pub fn validate_operand(opcode: Operation, operand: Option<u64>) -> Result<(), VmError> {
  match (opcode, operand) {
    (Operation::Load, Some(value)) if value > LOAD_OPERAND_MAX => {
      Err(VmError::OperandOutOfRange {
        opcode,
        value,
        max: LOAD_OPERAND_MAX,
      })
    }
    (Operation::Write, Some(value)) if value > WRITE_OPERAND_MAX => {
      Err(VmError::OperandOutOfRange {
        opcode,
        value,
        max: WRITE_OPERAND_MAX,
      })
    }
    _ => Ok(()),
  }
}

/**
  Encodes the instruction into bytecode: `opcode | (operand << 7)` packed
  little-endian into the opcode's width. The operand is validated first, so
  no bytes are produced for an out-of-range instruction.
*/
pub fn encode_instruction(instruction: &Instruction) -> Result<Vec<u8>, VmError> {
  validate_operand(instruction.opcode(), instruction.operand())?;

  let bytes = match *instruction {
    Instruction::Load(operand) => {
      let word = Operation::Load.code() as u64 | ((operand as u64) << OPCODE_BITS);
      word.to_le_bytes()[..instruction_size(Operation::Load)].to_vec()
    }

    Instruction::Write(address) => {
      let word = Operation::Write.code() as u32 | ((address as u32) << OPCODE_BITS);
      word.to_le_bytes()[..instruction_size(Operation::Write)].to_vec()
    }

    Instruction::Read  => vec![Operation::Read.code()],
    Instruction::Bswap => vec![Operation::Bswap.code()],
  };
  Ok(bytes)
}

/// Concatenates the instruction encodings in program order. The first
/// invalid instruction aborts the whole translation.
pub fn encode_program(instructions: &[Instruction]) -> Result<Vec<u8>, VmError> {
  let mut program = Vec::new();
  for instruction in instructions {
    program.extend(encode_instruction(instruction)?);
  }
  Ok(program)
}

/**
  Decodes one instruction at the given byte offset.

  The low seven bits of the byte at `offset` select the opcode (the eighth
  bit is reserved and ignored), which in turn fixes how many bytes the
  instruction occupies. Returns the instruction together with the offset of
  the next one, or `None` when `offset` is at or past the end of the buffer.
*/
pub fn try_decode_instruction(
  program: &[u8],
  offset: usize,
) -> Result<Option<(Instruction, usize)>, VmError> {
  let first = match program.get(offset) {
    Some(byte) => *byte,
    None => return Ok(None),
  };

  let value = first & OPCODE_MASK;
  let opcode =
    Operation::try_from(value).map_err(|_| VmError::UnknownOpcode { value, offset })?;

  let size = instruction_size(opcode);
  if offset + size > program.len() {
    return Err(VmError::TruncatedInstruction {
      opcode,
      offset,
      needed: size,
      available: program.len() - offset,
    });
  }

  let instruction = match opcode {
    Operation::Load => {
      let mut raw = [0u8; 8];
      raw[..size].copy_from_slice(&program[offset..offset + size]);
      let word = u64::from_le_bytes(raw);
      Instruction::Load(((word >> OPCODE_BITS) & LOAD_OPERAND_MAX) as u32)
    }

    Operation::Write => {
      let mut raw = [0u8; 8];
      raw[..size].copy_from_slice(&program[offset..offset + size]);
      let word = u64::from_le_bytes(raw);
      // Full 13-bit field, one bit wider than the encoder ever emits.
      Instruction::Write(((word >> OPCODE_BITS) & WRITE_FIELD_MASK) as u16)
    }

    Operation::Read  => Instruction::Read,
    Operation::Bswap => Instruction::Bswap,
  };

  Ok(Some((instruction, offset + size)))
}

/// Decodes an entire program sequentially from offset zero.
pub fn disassemble(program: &[u8]) -> Result<Vec<Instruction>, VmError> {
  let mut instructions = Vec::new();
  let mut offset = 0;
  while let Some((instruction, next)) = try_decode_instruction(program, offset)? {
    instructions.push(instruction);
    offset = next;
  }
  Ok(instructions)
}

#[cfg(test)]
mod tests {
  use proptest::prelude::*;

  use super::*;

  #[test]
  fn known_encodings() {
    assert_eq!(
      encode_instruction(&Instruction::Load(500)).unwrap(),
      vec![0x39, 0xFA, 0x00, 0x00, 0x00]
    );
    assert_eq!(
      encode_instruction(&Instruction::Write(10)).unwrap(),
      vec![0x70, 0x05, 0x00]
    );
    assert_eq!(encode_instruction(&Instruction::Read).unwrap(), vec![0x66]);
    assert_eq!(encode_instruction(&Instruction::Bswap).unwrap(), vec![0x05]);
  }

  #[test]
  fn write_operand_above_encoder_bound_is_rejected() {
    let error = encode_instruction(&Instruction::Write(4096)).unwrap_err();
    assert_eq!(
      error,
      VmError::OperandOutOfRange {
        opcode: Operation::Write,
        value: 4096,
        max: WRITE_OPERAND_MAX,
      }
    );
  }

  #[test]
  fn load_operand_above_encoder_bound_is_rejected() {
    let error = encode_instruction(&Instruction::Load(0x8000_0000)).unwrap_err();
    assert_eq!(
      error,
      VmError::OperandOutOfRange {
        opcode: Operation::Load,
        value: 0x8000_0000,
        max: LOAD_OPERAND_MAX,
      }
    );
  }

  #[test]
  fn forced_thirteen_bit_write_still_decodes() {
    // The wire field is 13 bits even though the assembler stops at 12.
    let word = Operation::Write.code() as u32 | (5000u32 << OPCODE_BITS);
    let bytes = &word.to_le_bytes()[..3];
    let (instruction, next) = try_decode_instruction(bytes, 0).unwrap().unwrap();
    assert_eq!(instruction, Instruction::Write(5000));
    assert_eq!(next, 3);
  }

  #[test]
  fn truncated_load_is_an_error() {
    let error = try_decode_instruction(&[0x39], 0).unwrap_err();
    assert_eq!(
      error,
      VmError::TruncatedInstruction {
        opcode: Operation::Load,
        offset: 0,
        needed: 5,
        available: 1,
      }
    );
  }

  #[test]
  fn unknown_opcode_is_an_error() {
    let error = try_decode_instruction(&[13], 0).unwrap_err();
    assert_eq!(error, VmError::UnknownOpcode { value: 13, offset: 0 });
  }

  #[test]
  fn reserved_high_bit_is_ignored() {
    let (instruction, _) = try_decode_instruction(&[0x66 | 0x80], 0)
      .unwrap()
      .unwrap();
    assert_eq!(instruction, Instruction::Read);
  }

  #[test]
  fn decoding_past_the_end_yields_none() {
    assert_eq!(try_decode_instruction(&[], 0).unwrap(), None);
    assert_eq!(try_decode_instruction(&[0x66], 1).unwrap(), None);
  }

  #[test]
  fn disassemble_walks_variable_widths() {
    let program = [0x39, 0xFA, 0x00, 0x00, 0x00, 0x70, 0x05, 0x00, 0x66, 0x05];
    assert_eq!(
      disassemble(&program).unwrap(),
      vec![
        Instruction::Load(500),
        Instruction::Write(10),
        Instruction::Read,
        Instruction::Bswap,
      ]
    );
  }

  proptest! {
    #[test]
    fn load_round_trips(value in 0u32..=0x7FFF_FFFF) {
      let bytes = encode_instruction(&Instruction::Load(value)).unwrap();
      let (decoded, next) = try_decode_instruction(&bytes, 0).unwrap().unwrap();
      prop_assert_eq!(decoded, Instruction::Load(value));
      prop_assert_eq!(next, bytes.len());
    }

    #[test]
    fn write_round_trips(address in 0u16..=4095) {
      let bytes = encode_instruction(&Instruction::Write(address)).unwrap();
      let (decoded, next) = try_decode_instruction(&bytes, 0).unwrap().unwrap();
      prop_assert_eq!(decoded, Instruction::Write(address));
      prop_assert_eq!(next, bytes.len());
    }
  }
}

/*!
  The human readable textual form of a program is a row-oriented listing: a
  header row (`opcode,operand`) followed by one instruction per row, e.g.

    opcode,operand
    LOAD,500
    WRITE,10
    READ,
    BSWAP,

  Mnemonics are case-insensitive; the operand field is a decimal integer and
  must be empty or absent for the operandless opcodes. This module parses
  listings into typed instructions, leveraging the `strum` derives on
  `Operation` for mnemonic lookup, and renders encoded programs back as
  tables for diagnostics.
*/

use std::str::FromStr;

use nom::{
  character::complete::{alpha1, char as one_char, digit1, space0},
  combinator::{all_consuming, opt},
  sequence::{delimited, pair, preceded},
  IResult,
};
use prettytable::Table;

use super::binary::{encode_program, try_decode_instruction, validate_operand};
use super::{Instruction, Operation};
use crate::errors::VmError;
use crate::machine::TABLE_DISPLAY_FORMAT;

/// One data row: a mnemonic and an optional operand field, which may itself
/// be empty (`READ,` carries no operand).
fn row(line: &str) -> IResult<&str, (&str, Option<Option<&str>>)> {
  all_consuming(delimited(
    space0,
    pair(
      alpha1,
      opt(preceded(
        delimited(space0, one_char(','), space0),
        opt(digit1),
      )),
    ),
    space0,
  ))(line)
}

// The header must lead with an `opcode` field. Trailing `operand` fields
// (or an empty trailer) are accepted.
fn header_is_valid(line: &str) -> bool {
  let mut fields = line.split(',').map(str::trim);
  let leads = matches!(fields.next(), Some(field) if field.eq_ignore_ascii_case("opcode"));
  leads && fields.all(|field| field.is_empty() || field.eq_ignore_ascii_case("operand"))
}

fn parse_row(line: usize, content: &str) -> Result<Instruction, VmError> {
  let malformed = || VmError::MalformedRow {
    line,
    content: content.trim().to_string(),
  };

  let (_, (mnemonic, operand_field)) = row(content.trim_end()).map_err(|_| malformed())?;

  let opcode = Operation::from_str(&mnemonic.to_ascii_uppercase()).map_err(|_| {
    VmError::UnknownMnemonic {
      name: mnemonic.to_string(),
      line,
    }
  })?;

  let operand = match operand_field.flatten() {
    Some(digits) => Some(digits.parse::<u64>().map_err(|_| malformed())?),
    None => None,
  };

  if operand.is_some() != opcode.takes_operand() {
    return Err(match operand {
      None    => VmError::MissingOperand { opcode, line },
      Some(_) => VmError::UnexpectedOperand { opcode, line },
    });
  }

  validate_operand(opcode, operand)?;

  Ok(match (opcode, operand) {
    (Operation::Load, Some(value))  => Instruction::Load(value as u32),
    (Operation::Write, Some(value)) => Instruction::Write(value as u16),
    (Operation::Read, _)            => Instruction::Read,
    (Operation::Bswap, _)           => Instruction::Bswap,
    (Operation::Load, None) | (Operation::Write, None) => {
      unreachable!("operand presence was checked against the opcode arity")
    }
  })
}

/**
  Parses a listing into typed instructions. Blank lines are skipped; every
  error carries the 1-based line number of the offending row. An empty
  listing (no header, no rows) parses to an empty program.
*/
pub fn parse_listing(text: &str) -> Result<Vec<Instruction>, VmError> {
  let mut rows = text
    .lines()
    .enumerate()
    .map(|(index, line)| (index + 1, line))
    .filter(|(_, line)| !line.trim().is_empty());

  match rows.next() {
    None => return Ok(vec![]),
    Some((line, content)) if !header_is_valid(content) => {
      return Err(VmError::MalformedRow {
        line,
        content: content.trim().to_string(),
      });
    }
    Some(_) => {}
  }

  let mut instructions = Vec::new();
  for (line, content) in rows {
    instructions.push(parse_row(line, content)?);
  }
  Ok(instructions)
}

/// Full translation pipeline: listing text to binary program. The first
/// invalid row aborts the whole translation with no partial output.
pub fn assemble(text: &str) -> Result<Vec<u8>, VmError> {
  let instructions = parse_listing(text)?;
  tracing::debug!(instructions = instructions.len(), "listing parsed");
  encode_program(&instructions)
}

/// Renders a binary program as a table of decoded instructions with their
/// byte offsets and hexadecimal encodings.
pub fn listing_table(program: &[u8]) -> Result<Table, VmError> {
  let mut table = Table::new();
  table.set_format(*TABLE_DISPLAY_FORMAT);
  table.set_titles(row![ubr->"Offset", ubl->"Instruction", ubl->"Bytes"]);

  let mut offset = 0;
  while let Some((instruction, next)) = try_decode_instruction(program, offset)? {
    let hex = program[offset..next]
      .iter()
      .map(|byte| format!("{:02X}", byte))
      .collect::<Vec<String>>()
      .join(" ");
    table.add_row(row![r->format!("{:04}", offset), instruction, hex]);
    offset = next;
  }
  Ok(table)
}

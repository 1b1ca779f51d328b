//! The execution engine: a single accumulator and a flat 64K-cell memory,
//! driven by a strict fetch-decode-execute loop over a binary program.

use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use prettytable::{format as TableFormat, Table};
use serde::Serialize;

use crate::bytecode::{try_decode_instruction, Instruction, Operation, Word};
use crate::errors::VmError;

/// Number of addressable memory cells.
pub const MEMORY_SIZE: usize = 1 << 16;

lazy_static! {
  pub(crate) static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

/**
  Post-execution view of an address range: an insertion-ordered mapping from
  address to cell value, ascending by address. Serializes to a JSON object
  keyed by decimal address.
*/
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct MemorySnapshot(IndexMap<u32, Word>);

impl MemorySnapshot {
  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn get(&self, address: u32) -> Option<Word> {
    self.0.get(&address).copied()
  }

  pub fn iter(&self) -> impl Iterator<Item = (u32, Word)> + '_ {
    self.0.iter().map(|(address, value)| (*address, *value))
  }
}

/**
  Machine state for one execution run: the accumulator, the program counter
  (a byte offset into the program), and memory, all zeroed at construction.
  A `Machine` is exclusively owned by its caller for the duration of a run;
  nothing is shared or persisted across runs.
*/
pub struct Machine {
  accumulator: Word,
  pc: usize,
  memory: Vec<Word>,
}

impl Machine {
  pub fn new() -> Machine {
    Machine {
      accumulator: 0,
      pc: 0,
      memory: vec![0; MEMORY_SIZE],
    }
  }

  pub fn accumulator(&self) -> Word {
    self.accumulator
  }

  pub fn program_counter(&self) -> usize {
    self.pc
  }

  /**
    Decodes and executes `program` from offset zero until the buffer is
    exhausted. The instruction set has no control flow, so every run
    terminates once the cursor reaches the end. The first malformed
    instruction or invalid access aborts the run with no partial-result
    recovery.
  */
  pub fn run(&mut self, program: &[u8]) -> Result<(), VmError> {
    let mut executed = 0u64;

    while let Some((instruction, next_pc)) = try_decode_instruction(program, self.pc)? {
      self.pc = next_pc;
      self.execute(&instruction)?;
      executed += 1;

      #[cfg(feature = "trace_execution")]
      println!("{}\n{}", instruction, self);
    }

    tracing::debug!(instructions = executed, "execution finished");
    Ok(())
  }

  fn execute(&mut self, instruction: &Instruction) -> Result<(), VmError> {
    match *instruction {
      Instruction::Load(operand) => {
        self.accumulator = operand;
      }

      Instruction::Read => {
        let address = self.accumulator as usize;
        self.check_address(Operation::Read, address)?;
        self.accumulator = self.memory[address];
      }

      Instruction::Write(operand) => {
        let address = operand as usize;
        self.check_address(Operation::Write, address)?;
        self.memory[address] = self.accumulator;
      }

      Instruction::Bswap => {
        self.accumulator = self.accumulator.swap_bytes();
      }
    }
    Ok(())
  }

  // Out-of-range addresses are a fatal error, never a silent wrap.
  fn check_address(&self, opcode: Operation, address: usize) -> Result<(), VmError> {
    match address < self.memory.len() {
      true  => Ok(()),
      false => Err(VmError::MemoryOutOfRange {
        opcode,
        address: address as u64,
        limit: (self.memory.len() - 1) as u64,
      }),
    }
  }

  /**
    Reads the inclusive address range `[start, end]`, with `end` clipped to
    the last valid cell. Empty when the clipped range is empty. A pure read;
    machine state is not touched.
  */
  pub fn snapshot(&self, start: usize, end: usize) -> MemorySnapshot {
    let mut dump = IndexMap::new();
    for address in start..=end.min(self.memory.len() - 1) {
      dump.insert(address as u32, self.memory[address]);
    }
    MemorySnapshot(dump)
  }
}

impl Default for Machine {
  fn default() -> Machine {
    Machine::new()
  }
}

impl Display for Machine {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let mut table = Table::new();
    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Register", ubl->"Contents"]);
    table.add_row(row![
      r->"ACC =",
      format!("{:#010X} ({})", self.accumulator, self.accumulator)
    ]);
    table.add_row(row![r->"PC =", self.pc]);
    table.add_row(row![
      r->"nonzero cells =",
      self.memory.iter().filter(|value| **value != 0).count()
    ]);
    write!(f, "{}", table)
  }
}

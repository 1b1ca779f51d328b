/*!

  The machine uses a variable-width little-endian instruction encoding. Every
  instruction begins with a 7-bit opcode stored in the low bits of its first
  byte; the eighth bit is reserved and ignored on decode. Operand-carrying
  instructions pack `opcode | (operand << 7)` into a little-endian word:

    LOAD   5 bytes   operand 31 bits
    WRITE  3 bytes   operand 12 bits accepted, 13 bits representable
    READ   1 byte    no operand
    BSWAP  1 byte    no operand

  A program is the bare concatenation of encoded instructions. There is no
  header, length prefix, or trailing marker; instruction boundaries exist
  only implicitly, discovered by decoding each instruction's width in turn
  from offset zero.

  One design decision that needed to be made is how to represent decoded
  instructions in memory. Since the instruction set is four opcodes with at
  most one operand, an enum with one variant per opcode is both compact and
  exhaustive: adding an opcode forces every encode and decode site to be
  revisited at compile time.

*/

mod assembly;
mod binary;
mod instruction;

pub use assembly::{assemble, listing_table, parse_listing};
pub use binary::{
  disassemble, encode_instruction, encode_program, instruction_size, try_decode_instruction,
  validate_operand, Word, LOAD_OPERAND_MAX, OPCODE_BITS, OPCODE_MASK, WRITE_FIELD_MASK,
  WRITE_OPERAND_MAX,
};
pub use instruction::{Instruction, Operation};

//! The full assemble-execute-snapshot pipeline over the reference program.

use uvm::bytecode::{assemble, disassemble, Instruction};
use uvm::machine::Machine;

const LISTING: &str = "opcode,operand
LOAD,500
WRITE,10
READ,
BSWAP,
";

const REFERENCE_BYTES: [u8; 10] = [0x39, 0xFA, 0x00, 0x00, 0x00, 0x70, 0x05, 0x00, 0x66, 0x05];

#[test]
fn reference_listing_assembles_to_the_reference_bytes() {
  assert_eq!(assemble(LISTING).unwrap(), REFERENCE_BYTES);
}

#[test]
fn reference_bytes_disassemble_back_to_the_source_instructions() {
  assert_eq!(
    disassemble(&REFERENCE_BYTES).unwrap(),
    vec![
      Instruction::Load(500),
      Instruction::Write(10),
      Instruction::Read,
      Instruction::Bswap,
    ]
  );
}

#[test]
fn reference_program_executes_to_the_expected_snapshot() {
  let program = assemble(LISTING).unwrap();
  let mut machine = Machine::new();
  machine.run(&program).unwrap();

  // READ pulled memory[500] = 0 into the accumulator, BSWAP kept it 0.
  assert_eq!(machine.accumulator(), 0);

  let snapshot = machine.snapshot(0, 15);
  assert_eq!(snapshot.len(), 16);
  for (address, value) in snapshot.iter() {
    let expected = if address == 10 { 500 } else { 0 };
    assert_eq!(value, expected, "address {}", address);
  }
}

#[test]
fn snapshot_serializes_to_a_decimal_keyed_json_object() {
  let program = assemble(LISTING).unwrap();
  let mut machine = Machine::new();
  machine.run(&program).unwrap();

  let json = serde_json::to_string(&machine.snapshot(9, 11)).unwrap();
  assert_eq!(json, r#"{"9":0,"10":500,"11":0}"#);
}

//! Command-line surface: `asm` translates a textual listing into a binary
//! program, `run` executes a binary program and writes a JSON memory dump.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use uvm::bytecode::{assemble, listing_table};
use uvm::machine::Machine;

#[derive(Parser, Debug)]
#[command(name = "uvm")]
#[command(version)]
#[command(about = "Assembler and interpreter for a single-accumulator bytecode machine")]
struct Args {
  #[command(subcommand)]
  command: Commands,

  /// Enable verbose output
  #[arg(short, long)]
  verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
  /// Translate a textual instruction listing into a binary program
  Asm {
    /// Listing to assemble
    #[arg(value_name = "SOURCE")]
    source: PathBuf,

    /// Where to write the binary program
    #[arg(value_name = "PROGRAM")]
    program: PathBuf,

    /// Print the decoded instruction stream and the produced bytes in hex
    #[arg(long)]
    dump: bool,
  },

  /// Execute a binary program and write a JSON memory dump
  Run {
    /// Binary program to execute
    #[arg(value_name = "PROGRAM")]
    program: PathBuf,

    /// Where to write the JSON memory dump
    #[arg(value_name = "DUMP")]
    dump: PathBuf,

    /// First address of the dumped range (inclusive)
    #[arg(value_name = "START")]
    start: usize,

    /// Last address of the dumped range (inclusive, clipped to memory)
    #[arg(value_name = "END")]
    end: usize,
  },
}

fn main() -> Result<()> {
  let args = Args::parse();

  tracing_subscriber::fmt()
    .with_max_level(match args.verbose {
      true  => tracing::Level::DEBUG,
      false => tracing::Level::INFO,
    })
    .with_target(false)
    .init();

  match args.command {
    Commands::Asm {
      source,
      program,
      dump,
    } => {
      let text = fs::read_to_string(&source)
        .with_context(|| format!("reading listing {}", source.display()))?;
      let bytes = assemble(&text)?;

      if dump {
        listing_table(&bytes)?.printstd();
        println!(
          "{}",
          bytes
            .iter()
            .map(|byte| format!("{:02X}", byte))
            .collect::<Vec<String>>()
            .join(" ")
        );
      }

      fs::write(&program, &bytes)
        .with_context(|| format!("writing program {}", program.display()))?;
      tracing::info!(bytes = bytes.len(), "assembled {}", program.display());
    }

    Commands::Run {
      program,
      dump,
      start,
      end,
    } => {
      let bytes =
        fs::read(&program).with_context(|| format!("reading program {}", program.display()))?;

      let mut machine = Machine::new();
      machine.run(&bytes)?;

      let snapshot = machine.snapshot(start, end);
      let json = serde_json::to_string_pretty(&snapshot)?;
      fs::write(&dump, json).with_context(|| format!("writing dump {}", dump.display()))?;
      tracing::info!(
        addresses = snapshot.len(),
        "memory dump written to {}",
        dump.display()
      );
    }
  }

  Ok(())
}

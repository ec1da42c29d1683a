//! Generic IDL-driven CLI library.
//!
//! Reads a program's IDL document and uses it to summarise the program,
//! recognise and decode raw account, event and instruction bytes, build
//! instructions with their addresses resolved offline, and derive
//! program addresses from seeds.
//!
//! The `idl-cli` binary is a thin wrapper around [`run`].

pub mod cli;
pub mod decode;
pub mod encode;
pub mod encoding;
pub mod error;
pub mod inspect;
pub mod pda;

use std::fs;
use std::path::Path;

use idl_toolbox::program::IdlProgram;

use crate::cli::{Cli, Command};
use crate::error::{CliError, CliResult};

/// Execute one parsed command line and return what it prints.
pub async fn run(cli: Cli) -> CliResult<String> {
    if let Command::Pda { program_id, seeds } = &cli.command {
        return pda::run(program_id, seeds);
    }
    let path = cli.idl.as_deref().ok_or(CliError::MissingIdl)?;
    let program = load_program(path)?;
    match cli.command {
        Command::Inspect => inspect::run(&program),
        Command::DecodeAccount { data } => decode::account(&program, &data),
        Command::DecodeEvent { data } => decode::event(&program, &data),
        Command::DecodeInstruction { data } => decode::instruction(&program, &data),
        Command::EncodeInstruction {
            name,
            args,
            accounts,
            program_id,
        } => encode::run(&program, &name, &args, &accounts, program_id.as_deref()).await,
        Command::Pda { program_id, seeds } => pda::run(&program_id, &seeds),
    }
}

pub fn load_program(path: &Path) -> CliResult<IdlProgram> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(IdlProgram::from_json(&text)?)
}

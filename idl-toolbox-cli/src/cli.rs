//! Command-line surface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "idl-cli",
    version,
    about = "Inspect, decode and encode program payloads described by an IDL document"
)]
pub struct Cli {
    /// IDL JSON file
    #[arg(short, long, value_name = "FILE", global = true)]
    pub idl: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the program's accounts, instructions, events, errors and constants
    Inspect,

    /// Recognise raw account data and decode it
    DecodeAccount {
        /// Hex bytes, or base58:/base64: prefixed text
        data: String,
    },

    /// Recognise raw event data and decode it
    DecodeEvent {
        /// Hex bytes, or base58:/base64: prefixed text
        data: String,
    },

    /// Recognise raw instruction data and decode its arguments
    DecodeInstruction {
        /// Hex bytes, or base58:/base64: prefixed text
        data: String,
    },

    /// Resolve an instruction's addresses and encode it
    EncodeInstruction {
        /// Instruction name
        name: String,

        /// Arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,

        /// Known account address, repeatable
        #[arg(long = "account", value_name = "NAME=ADDRESS", value_parser = parse_assignment)]
        accounts: Vec<(String, String)>,

        /// Program address, defaults to the one declared in the IDL
        #[arg(long, value_name = "ADDRESS")]
        program_id: Option<String>,
    },

    /// Derive a program address from seeds
    Pda {
        #[arg(long, value_name = "ADDRESS")]
        program_id: String,

        /// Seeds as JSON byte literals; anything that is not JSON is taken as utf8 text
        #[arg(value_name = "SEED")]
        seeds: Vec<String>,
    },
}

fn parse_assignment(text: &str) -> Result<(String, String), String> {
    match text.split_once('=') {
        Some((name, value)) if !name.is_empty() && !value.is_empty() => {
            Ok((name.to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=ADDRESS, got '{}'", text)),
    }
}

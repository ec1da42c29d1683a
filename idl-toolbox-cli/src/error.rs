//! Errors surfaced to the command line.

use idl_toolbox_core::error::IdlError;
use thiserror::Error;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("this command needs an IDL document, pass --idl <FILE>")]
    MissingIdl,

    /// Malformed command-line input: data encoding, JSON arguments, addresses
    #[error("invalid {what}: {message}")]
    Input { what: String, message: String },

    #[error("no instruction named '{0}'")]
    UnknownInstruction(String),

    #[error("no program id, pass --program-id or declare an address in the IDL")]
    MissingProgramId,

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot format output: {0}")]
    Format(#[from] std::fmt::Error),

    #[error(transparent)]
    Idl(#[from] IdlError),
}

impl CliError {
    pub fn input(what: impl Into<String>, message: impl std::fmt::Display) -> Self {
        CliError::Input {
            what: what.into(),
            message: message.to_string(),
        }
    }
}

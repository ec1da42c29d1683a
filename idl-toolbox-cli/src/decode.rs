//! Recognise and decode raw bytes against the program's entries.

use idl_toolbox::program::IdlProgram;
use serde_json::{json, Value};
use tracing::debug;

use crate::encoding::decode_data;
use crate::error::CliResult;

pub fn account(program: &IdlProgram, data: &str) -> CliResult<String> {
    let bytes = decode_data(data)?;
    let account = program.guess_account(&bytes)?;
    debug!(account = %account.name, len = bytes.len(), "matched account");
    render(json!({"account": account.name, "value": account.decode(&bytes)?}))
}

pub fn event(program: &IdlProgram, data: &str) -> CliResult<String> {
    let bytes = decode_data(data)?;
    let event = program.guess_event(&bytes)?;
    debug!(event = %event.name, len = bytes.len(), "matched event");
    render(json!({"event": event.name, "value": event.decode(&bytes)?}))
}

pub fn instruction(program: &IdlProgram, data: &str) -> CliResult<String> {
    let bytes = decode_data(data)?;
    let instruction = program.guess_instruction(&bytes)?;
    debug!(instruction = %instruction.name, len = bytes.len(), "matched instruction");
    render(json!({
        "instruction": instruction.name,
        "args": instruction.decode_data(&bytes)?,
    }))
}

pub(crate) fn render(value: Value) -> CliResult<String> {
    Ok(serde_json::to_string_pretty(&value)?)
}

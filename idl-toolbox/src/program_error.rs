use idl_toolbox_core::error::{IdlError, IdlResult};
use serde_json::Value;

/// A custom error code a program can return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdlProgramError {
    pub code: u32,
    pub name: String,
    pub msg: Option<String>,
}

impl IdlProgramError {
    pub fn parse(name: &str, value: &Value) -> IdlResult<Self> {
        let code = value
            .get("code")
            .and_then(Value::as_u64)
            .and_then(|code| u32::try_from(code).ok())
            .ok_or_else(|| IdlError::parse(format!("error {} has no valid code", name)))?;
        Ok(IdlProgramError {
            code,
            name: name.to_string(),
            msg: value.get("msg").and_then(Value::as_str).map(String::from),
        })
    }
}

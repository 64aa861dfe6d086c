//! Shared helpers for command handlers.

use std::io::Read;
use std::path::Path;

use fleetsync_core::SourceInstance;

use crate::error::CliError;

/// Read a whole file, or stdin when `path` is `-`.
pub fn read_input(path: &Path) -> Result<String, CliError> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Parse an instance snapshot.
///
/// Accepts a bare instance object or a state-change event wrapping one in
/// `detail`.
pub fn parse_instance(raw: &str) -> Result<SourceInstance, CliError> {
    let mut value: serde_json::Value = serde_json::from_str(raw)?;
    if let Some(detail) = value.get_mut("detail") {
        value = detail.take();
    }
    if !value.is_object() {
        return Err(CliError::Validation {
            field: "instance".into(),
            reason: "expected a JSON object".into(),
        });
    }
    Ok(serde_json::from_value(value)?)
}

/// Read and parse the instance named on the command line.
pub fn read_instance(path: &Path) -> Result<SourceInstance, CliError> {
    parse_instance(&read_input(path)?)
}

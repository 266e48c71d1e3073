//! Classification of a finished script run into a single outcome.

use super::BridgeError;
use serde_json::Value;

/// Message used when the script exits non-zero without writing to stderr
pub const FALLBACK_FAILURE: &str = "PowerShell script failed";

/// Everything captured from one finished script process.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    /// Exit code, `None` when the process was terminated by a signal
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Turn the captured output into the bridge outcome
    pub fn classify(&self) -> Result<Value, BridgeError> {
        if !self.success() {
            return Err(BridgeError::Execution {
                code: self.code,
                message: self.failure_message(),
            });
        }

        let document = parse_document(&self.stdout)?;
        classify_document(document)
    }

    fn failure_message(&self) -> String {
        let stderr = decode(&self.stderr);
        if !stderr.is_empty() {
            return stderr;
        }
        match self.code {
            Some(code) => format!("{} (exit code {})", FALLBACK_FAILURE, code),
            None => FALLBACK_FAILURE.to_string(),
        }
    }
}

/// Lossy UTF-8 decode, trimmed, with any byte order mark removed
fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim()
        .trim_start_matches('\u{feff}')
        .trim()
        .to_string()
}

/// Parse stdout as exactly one JSON object or array
pub fn parse_document(stdout: &[u8]) -> Result<Value, BridgeError> {
    let text = decode(stdout);
    let document: Value =
        serde_json::from_str(&text).map_err(|e| BridgeError::Protocol(e.to_string()))?;

    match document {
        Value::Object(_) | Value::Array(_) => Ok(document),
        other => Err(BridgeError::Protocol(format!(
            "expected a JSON object or array, got {}",
            kind(&other)
        ))),
    }
}

/// Split a parsed document into payload or tool-reported failure.
///
/// An object whose `error` field is truthy is a failure. Every other
/// document is the payload, returned unchanged.
pub fn classify_document(document: Value) -> Result<Value, BridgeError> {
    if let Some(message) = document.get("error").and_then(error_text) {
        return Err(BridgeError::ToolReported(message));
    }
    Ok(document)
}

/// Text of an error indicator, `None` when the indicator is falsy
fn error_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Number(number) if number.as_f64() == Some(0.0) => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

use crate::bridge::BridgeError;
use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// The PowerShell bridge reported a failure; the message is the bridge's own
    #[error(transparent)]
    #[diagnostic(code(outlook_calendar::bridge))]
    Bridge(#[from] BridgeError),

    #[error("Invalid request: {0}")]
    #[diagnostic(code(outlook_calendar::validation))]
    Validation(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(outlook_calendar::config))]
    Config(String),

    #[error("Component error: {0}")]
    #[diagnostic(code(outlook_calendar::component))]
    Component(String),

    #[error(transparent)]
    #[diagnostic(code(outlook_calendar::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(outlook_calendar::serialization))]
    Serialization(String),

    /// The MCP session could not be set up or ended abnormally
    #[error("MCP error: {0}")]
    #[diagnostic(code(outlook_calendar::mcp))]
    Mcp(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(outlook_calendar::other))]
    Other(String),
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type CalendarResult<T> = Result<T, Error>;

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create validation errors
pub fn validation_error(message: &str) -> Error {
    Error::Validation(message.to_string())
}

/// Helper to create component errors
pub fn component_error(message: &str) -> Error {
    Error::Component(message.to_string())
}

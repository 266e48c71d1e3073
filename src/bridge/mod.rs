//! Out-of-process bridge to the Outlook automation script.
//!
//! Every call spawns one interpreter process running the calendar script,
//! passes the action and its parameters as arguments and turns whatever the
//! process leaves behind (exit status, stdout, stderr) into exactly one
//! outcome. The bridge knows nothing about calendars: parameters are an
//! opaque [`Params`] mapping and successful payloads are returned as parsed
//! JSON.

pub mod output;
pub mod params;
mod process;

pub use output::ProcessOutput;
pub use params::{ParamValue, Params};

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Interpreter used when none is configured
pub const DEFAULT_INTERPRETER: &str = "powershell.exe";

/// Script file name, resolved relative to the installation directory
pub const SCRIPT_FILE_NAME: &str = "outlook-calendar.ps1";

/// Default wall-clock limit for a single script run
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Operations understood by the calendar script's `-Action` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    List,
    Get,
    Create,
    Update,
    Delete,
    Search,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::List => "list",
            Action::Get => "get",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Search => "search",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a script run did not produce a payload.
///
/// The `Display` text is the message shown to end users, so the variants only
/// add wording where the raw message would be ambiguous.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The interpreter could not be started at all
    #[error("failed to start {interpreter}: {source}")]
    Spawn {
        interpreter: String,
        #[source]
        source: std::io::Error,
    },

    /// The script ran and exited with a non-zero status
    #[error("{message}")]
    Execution { code: Option<i32>, message: String },

    /// The script exited cleanly but stdout was not a JSON document
    #[error("could not parse output: {0}")]
    Protocol(String),

    /// The script produced JSON that flags an error
    #[error("{0}")]
    ToolReported(String),

    /// The run exceeded the configured limit and was killed
    #[error("timed out")]
    Timeout(Duration),

    /// Reading the process streams or waiting on it failed
    #[error("I/O error while running script: {0}")]
    Io(#[from] std::io::Error),
}

/// Anything that can run a calendar script action.
///
/// [`PowerShellBridge`] is the real implementation; tests substitute their own.
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    async fn execute(&self, action: Action, params: Params) -> Result<Value, BridgeError>;
}

/// Explicit bridge configuration, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Interpreter executable, looked up on `PATH` when not absolute
    pub interpreter: String,
    /// Path of the calendar script
    pub script_path: PathBuf,
    /// Limit for a single run; `None` waits for the process indefinitely
    pub timeout: Option<Duration>,
}

impl BridgeConfig {
    pub fn new(interpreter: impl Into<String>, script_path: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            script_path: script_path.into(),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Arguments passed to the interpreter for one run
    pub fn build_args(&self, action: Action, params: &Params) -> Vec<String> {
        let mut args = vec![
            "-NoProfile".to_string(),
            "-ExecutionPolicy".to_string(),
            "Bypass".to_string(),
            "-File".to_string(),
            self.script_path.to_string_lossy().into_owned(),
            "-Action".to_string(),
            action.as_str().to_string(),
        ];
        args.extend(params.to_args());
        args
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INTERPRETER, default_script_path())
    }
}

/// `scripts/outlook-calendar.ps1` next to the running executable
pub fn default_script_path() -> PathBuf {
    let base = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("scripts").join(SCRIPT_FILE_NAME)
}

/// Runs calendar actions by spawning the configured interpreter.
#[derive(Debug, Clone)]
pub struct PowerShellBridge {
    config: BridgeConfig,
}

impl PowerShellBridge {
    pub fn new(config: BridgeConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ScriptRunner for PowerShellBridge {
    async fn execute(&self, action: Action, params: Params) -> Result<Value, BridgeError> {
        let args = self.config.build_args(action, &params);
        tracing::debug!(
            action = %action,
            params = ?params.names(),
            "running calendar script"
        );

        let output = process::run(&self.config, action, &args).await?;
        let result = output.classify();

        if let Err(e) = &result {
            tracing::warn!(action = %action, error = %e, "calendar script failed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_layout() {
        let config = BridgeConfig::new("pwsh", "C:/tools/outlook-calendar.ps1");
        let params = Params::new()
            .with("Subject", "Team Sync")
            .with("StartDate", "2024-06-01T09:00:00")
            .with("EndDate", "2024-06-01T10:00:00")
            .with_opt::<String>("Body", None);

        let args = config.build_args(Action::Create, &params);
        assert_eq!(
            args,
            vec![
                "-NoProfile",
                "-ExecutionPolicy",
                "Bypass",
                "-File",
                "C:/tools/outlook-calendar.ps1",
                "-Action",
                "create",
                "-Subject",
                "Team Sync",
                "-StartDate",
                "2024-06-01T09:00:00",
                "-EndDate",
                "2024-06-01T10:00:00",
            ]
        );
    }

    #[test]
    fn test_list_without_params_still_has_action() {
        let config = BridgeConfig::new("pwsh", "script.ps1");
        let args = config.build_args(Action::List, &Params::new());
        assert_eq!(args.len(), 7);
        assert_eq!(&args[5..], ["-Action", "list"]);
    }

    #[test]
    fn test_default_script_path_points_at_scripts_dir() {
        let path = default_script_path();
        assert!(path.ends_with(Path::new("scripts").join(SCRIPT_FILE_NAME)));
    }

    #[test]
    fn test_error_messages() {
        let err = BridgeError::Timeout(Duration::from_secs(5));
        assert_eq!(err.to_string(), "timed out");

        let err = BridgeError::Spawn {
            interpreter: "powershell.exe".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "program not found"),
        };
        assert_eq!(
            err.to_string(),
            "failed to start powershell.exe: program not found"
        );
    }
}

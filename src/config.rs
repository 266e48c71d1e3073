use crate::bridge::{default_script_path, BridgeConfig, DEFAULT_INTERPRETER, DEFAULT_TIMEOUT};
use crate::error::{config_error, CalendarResult};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Optional file with bridge settings, relative to the working directory
pub const CONFIG_FILE: &str = "config/bridge.toml";

/// Main configuration structure for the server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// PowerShell executable used to run the calendar script
    pub interpreter: String,
    /// Location of `outlook-calendar.ps1`
    pub script_path: PathBuf,
    /// Seconds before a script run is killed; 0 disables the limit
    pub timeout_secs: u64,
    /// Whether the interpreter was set explicitly rather than defaulted
    #[serde(skip)]
    pub interpreter_overridden: bool,
}

/// Shape of `config/bridge.toml`; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    interpreter: Option<String>,
    script_path: Option<PathBuf>,
    timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interpreter: DEFAULT_INTERPRETER.to_string(),
            script_path: default_script_path(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            interpreter_overridden: false,
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> CalendarResult<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Read settings from the given TOML file, when it exists, then the environment
    pub fn load_from(path: &Path) -> CalendarResult<Self> {
        // Load .env file if it exists
        dotenv().ok();
        Self::from_path(path, |key| env::var(key).ok())
    }

    fn from_path(path: &Path, var: impl Fn(&str) -> Option<String>) -> CalendarResult<Self> {
        let file = match fs::read_to_string(path) {
            Ok(content) => Some(Self::parse_file(&content)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        Self::from_sources(file, var)
    }

    fn parse_file(content: &str) -> CalendarResult<FileConfig> {
        Ok(toml::from_str::<FileConfig>(content)?)
    }

    /// Merge defaults, file values and environment values, in that order of precedence
    fn from_sources(
        file: Option<FileConfig>,
        var: impl Fn(&str) -> Option<String>,
    ) -> CalendarResult<Self> {
        let mut config = Config::default();

        if let Some(file) = file {
            if let Some(interpreter) = file.interpreter {
                config.interpreter = interpreter;
                config.interpreter_overridden = true;
            }
            if let Some(script_path) = file.script_path {
                config.script_path = script_path;
            }
            if let Some(timeout_secs) = file.timeout_secs {
                config.timeout_secs = timeout_secs;
            }
        }

        if let Some(interpreter) = var("OUTLOOK_INTERPRETER").filter(|v| !v.is_empty()) {
            config.interpreter = interpreter;
            config.interpreter_overridden = true;
        }
        if let Some(script_path) = var("OUTLOOK_SCRIPT_PATH").filter(|v| !v.is_empty()) {
            config.script_path = PathBuf::from(script_path);
        }
        if let Some(timeout) = var("OUTLOOK_TIMEOUT_SECS").filter(|v| !v.is_empty()) {
            config.timeout_secs = timeout
                .trim()
                .parse::<u64>()
                .map_err(|_| config_error("Invalid OUTLOOK_TIMEOUT_SECS format"))?;
        }

        Ok(config)
    }

    /// Script run limit, `None` when disabled
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Build the bridge configuration from these settings
    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig::new(self.interpreter.clone(), self.script_path.clone())
            .with_timeout(self.timeout())
    }
}

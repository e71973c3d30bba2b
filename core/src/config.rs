//! Configuration loading and validation
//!
//! Settings are read from a YAML document such as `~/.splunk.hec.yaml`:
//!
//! ```yaml
//! log_level: 5
//! collector:
//!   proto: https
//!   host: splunk.example.com
//!   port: 8088
//!   token: 00000000-0000-0000-0000-000000000000
//!   timeout: 5
//! ```
//!
//! Loading never touches global logger state. The desired level is returned
//! in [`Settings::log_level`] for the caller to apply.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::Level;

use crate::error::ConfigError;

const DEFAULT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_PORT: u16 = 8088;

/// Transport protocol of the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    Http,
    #[default]
    Https,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection settings for one collector.
#[derive(Clone, PartialEq, Eq)]
pub struct CollectorSettings {
    pub protocol: Protocol,
    pub host: String,
    pub port: u16,
    pub token: String,
    pub timeout: Duration,
    /// Skip server certificate verification. Off unless explicitly enabled.
    pub insecure_skip_verify: bool,
}

impl CollectorSettings {
    /// Settings with every optional field at its default.
    pub fn new(host: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            protocol: Protocol::default(),
            host: host.into(),
            port: DEFAULT_PORT,
            token: token.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            insecure_skip_verify: false,
        }
    }
}

impl fmt::Debug for CollectorSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectorSettings")
            .field("protocol", &self.protocol)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("insecure_skip_verify", &self.insecure_skip_verify)
            .finish()
    }
}

/// A loaded and validated configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Absolute path the settings were read from.
    pub file: PathBuf,
    /// Level the caller should apply to its logger.
    pub log_level: Level,
    pub collector: CollectorSettings,
}

/// On-disk shape, before defaults and validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSettings {
    log_level: Option<RawLogLevel>,
    // `collector: ~` behaves like an empty section.
    collector: Option<RawCollector>,
}

/// `log_level` as a number (`5`) or a level name (`debug`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawLogLevel {
    Code(u8),
    Name(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCollector {
    proto: String,
    host: String,
    port: u16,
    token: String,
    timeout: u64,
    insecure_skip_verify: bool,
}

impl Settings {
    /// Load settings from a YAML file. A leading `~/` is expanded to the
    /// current user's home directory and relative paths are made absolute.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = resolve_path(path.as_ref(), dirs::home_dir())?;
        tracing::debug!(path = %file.display(), "loading collector configuration");
        let content = std::fs::read_to_string(&file).map_err(|source| ConfigError::Read {
            path: file.clone(),
            source,
        })?;
        Self::from_yaml(file, &content)
    }

    /// Parse and validate an in-memory YAML document.
    pub fn from_yaml(file: impl Into<PathBuf>, content: &str) -> Result<Self, ConfigError> {
        let file = file.into();
        let raw: RawSettings = serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: file.clone(),
            source,
        })?;
        raw.validate(file)
    }
}

impl RawSettings {
    // Order matters: it decides which error a doubly broken file reports.
    fn validate(self, file: PathBuf) -> Result<Settings, ConfigError> {
        let c = self.collector.unwrap_or_default();
        let timeout = if c.timeout == 0 { DEFAULT_TIMEOUT_SECS } else { c.timeout };
        let log_level = match self.log_level {
            None => Level::INFO,
            Some(RawLogLevel::Code(code)) => log_level_from_code(code)?,
            Some(RawLogLevel::Name(name)) => log_level_from_name(&name)?,
        };
        if c.host.is_empty() {
            return Err(ConfigError::Missing("collector.host"));
        }
        if c.token.is_empty() {
            return Err(ConfigError::Missing("collector.token"));
        }
        let port = if c.port == 0 { DEFAULT_PORT } else { c.port };
        let protocol = match c.proto.as_str() {
            "" | "https" => Protocol::Https,
            "http" => Protocol::Http,
            other => return Err(ConfigError::InvalidProtocol(other.to_string())),
        };

        Ok(Settings {
            file,
            log_level,
            collector: CollectorSettings {
                protocol,
                host: c.host,
                port,
                token: c.token,
                timeout: Duration::from_secs(timeout),
                insecure_skip_verify: c.insecure_skip_verify,
            },
        })
    }
}

/// Map the numeric `log_level` field to a tracing level.
///
/// 0 means unset and selects INFO. 1 (fatal) and 2 (error) both map to
/// ERROR, then 3 warn, 4 info, 5 debug, 6 trace.
pub fn log_level_from_code(code: u8) -> Result<Level, ConfigError> {
    match code {
        0 | 4 => Ok(Level::INFO),
        1 | 2 => Ok(Level::ERROR),
        3 => Ok(Level::WARN),
        5 => Ok(Level::DEBUG),
        6 => Ok(Level::TRACE),
        other => Err(ConfigError::InvalidLogLevel(other)),
    }
}

/// Map a level name, ignoring case. `panic` and `fatal` map to ERROR.
pub fn log_level_from_name(name: &str) -> Result<Level, ConfigError> {
    match name.to_ascii_lowercase().as_str() {
        "panic" | "fatal" | "error" => Ok(Level::ERROR),
        "warn" | "warning" => Ok(Level::WARN),
        "info" => Ok(Level::INFO),
        "debug" => Ok(Level::DEBUG),
        "trace" => Ok(Level::TRACE),
        _ => Err(ConfigError::UnknownLogLevel(name.to_string())),
    }
}

/// Expand `~/` against `home` and make the result absolute.
fn resolve_path(path: &Path, home: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    let expanded = match path.strip_prefix("~") {
        Ok(rest) => home
            .ok_or_else(|| ConfigError::HomeDir(path.display().to_string()))?
            .join(rest),
        Err(_) => path.to_path_buf(),
    };
    if expanded.is_absolute() {
        return Ok(expanded);
    }
    let cwd = std::env::current_dir().map_err(|source| ConfigError::Resolve {
        path: expanded.clone(),
        source,
    })?;
    Ok(cwd.join(expanded))
}

//! Error types for the HEC client.
//!
//! # Design
//! `InvalidToken` and `QueueFull` get dedicated variants because they are the
//! two documented failure answers of the health endpoint. Every other non-200
//! answer lands in `RemoteRejected` (event submission) or `UnexpectedStatus`
//! (health check) with the status code and the service's text.
//!
//! Variants produced by a request carry the client name, the operation and
//! the endpoint so a message is enough to locate the failure.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// The request that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    HealthCheck,
    Send,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::HealthCheck => f.write_str("health check"),
            Operation::Send => f.write_str("send"),
        }
    }
}

/// Errors raised while loading and validating settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for the expected schema.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A `~/` path was given but the home directory is unknown.
    #[error("cannot expand {0}: home directory is unknown")]
    HomeDir(String),

    /// The working directory is needed to resolve a relative path.
    #[error("cannot resolve {}: {source}", path.display())]
    Resolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required field is empty or absent.
    #[error("{0} is undefined")]
    Missing(&'static str),

    /// `collector.proto` is neither `http` nor `https`.
    #[error("collector.proto must be either http or https, got {0:?}")]
    InvalidProtocol(String),

    /// `log_level` is outside 0..=6.
    #[error("log_level must be between 0 and 6, got {0}")]
    InvalidLogLevel(u8),

    /// `log_level` is a name that matches no level.
    #[error("log_level {0:?} is not a known level name")]
    UnknownLogLevel(String),
}

/// Errors returned by `HecClient` operations.
#[derive(Debug, Error)]
pub enum HecError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Connection, TLS, timeout or body read failure.
    #[error("{client}: {op} {url} failed: {source}")]
    Transport {
        client: String,
        op: Operation,
        url: String,
        #[source]
        source: ureq::Error,
    },

    /// The event could not be encoded as JSON.
    #[error("{client}: send failed: cannot encode event: {source}")]
    Serialize {
        client: String,
        #[source]
        source: serde_json::Error,
    },

    /// The body is not a JSON service response. Carries the raw body.
    #[error("{client}: {op} {url} failed: the response is not JSON but: {body}")]
    MalformedResponse {
        client: String,
        op: Operation,
        url: String,
        body: String,
    },

    /// Health endpoint answered 400.
    #[error("{client}: health check {url} failed: invalid HEC token")]
    InvalidToken { client: String, url: String },

    /// Health endpoint answered 503.
    #[error("{client}: health check {url} failed: HEC is unhealthy, queues are full")]
    QueueFull { client: String, url: String },

    /// Event endpoint answered something other than 200.
    #[error("{client}: send {url} failed: {status} ({text})")]
    RemoteRejected {
        client: String,
        url: String,
        status: u16,
        text: String,
    },

    /// Health endpoint answered a status outside 200/400/503.
    #[error("{client}: health check {url} failed: {status} {text}")]
    UnexpectedStatus {
        client: String,
        url: String,
        status: u16,
        text: String,
    },

    /// A global tracing subscriber could not be installed.
    #[error("logging setup failed: {0}")]
    Logging(String),
}

/// Result type alias for hec-core.
pub type Result<T> = std::result::Result<T, HecError>;

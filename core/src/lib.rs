//! Blocking client for an HTTP Event Collector (HEC).
//!
//! # Overview
//! Loads connection settings from YAML, derives the collector endpoints,
//! checks the health endpoint and submits events one request at a time,
//! authenticating with `Authorization: Splunk <token>`.
//!
//! # Design
//! - `HecClient` is immutable after construction and safe to share between
//!   threads.
//! - Each operation is split into `build_*` (produces a plain-data request)
//!   and `parse_*` (classifies a plain-data response); `Transport` executes
//!   the round-trip in between.
//! - Configuration loading returns the desired log level instead of
//!   touching global logger state.
//!
//! # Example
//!
//! ```rust,no_run
//! use hec_core::{logging, Event, HecClient, Settings};
//!
//! let settings = Settings::load("~/.splunk.hec.yaml").expect("invalid configuration");
//! logging::init(settings.log_level).expect("logging already initialized");
//!
//! let client = HecClient::connect(&settings.collector).expect("collector is unhealthy");
//! let resp = client
//!     .send(&Event::new("deploy finished").with_field("service", "billing"))
//!     .expect("event rejected");
//! println!("accepted: {} ({})", resp.text, resp.code);
//! ```

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod logging;
pub mod transport;
pub mod types;

pub use client::{HecClient, DEFAULT_CLIENT_NAME};
pub use config::{CollectorSettings, Protocol, Settings};
pub use endpoints::Endpoints;
pub use error::{ConfigError, HecError, Operation, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::Transport;
pub use types::{Event, ResponseCode, ServiceResponse};

//! Logging setup for programs embedding the client.
//!
//! The library only emits `tracing` events. Applications install a
//! subscriber once, typically with the level returned by
//! [`Settings::load`](crate::config::Settings::load).

use tracing::Level;
use tracing_subscriber::{filter::LevelFilter, fmt::format::FmtSpan, EnvFilter};

use crate::error::{HecError, Result};

/// Install a global stderr subscriber.
///
/// `RUST_LOG` wins when set; otherwise events at `level` and above are kept.
pub fn init(level: Level) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(LevelFilter::from_level(level).into()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|e| HecError::Logging(e.to_string()))?;

    tracing::debug!(level = %level, "logging initialized");
    Ok(())
}

/// Initialize logging for tests (captured by the test harness)
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .with_span_events(FmtSpan::CLOSE)
        .try_init();
}

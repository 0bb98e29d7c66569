//! Diagnostics on stderr via `tracing`.
//!
//! `RUST_LOG` overrides the level picked from `-v` flags or the config file.

use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Install the global subscriber. Later calls are ignored.
pub fn init(level: LevelFilter) {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);

    let _ = tracing_subscriber::registry().with(layer).try_init();
}

/// Level for the given number of `-v` flags, falling back to the configured
/// level when no flag was passed.
pub fn resolve_level(verbosity: u8, configured: Option<&str>) -> LevelFilter {
    match verbosity {
        0 => configured.and_then(parse_level).unwrap_or(LevelFilter::WARN),
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

pub fn parse_level(s: &str) -> Option<LevelFilter> {
    match s.to_lowercase().as_str() {
        "error" => Some(LevelFilter::ERROR),
        "warn" => Some(LevelFilter::WARN),
        "info" => Some(LevelFilter::INFO),
        "debug" => Some(LevelFilter::DEBUG),
        "trace" => Some(LevelFilter::TRACE),
        _ => None,
    }
}

//! Structured logging for ns-math.
//!
//! The numerical routines emit `tracing` events only; installing a
//! subscriber is left to the host. This module offers a ready-made one:
//! - Human-readable console output for interactive use
//! - JSON lines for machine consumption
//!
//! # Usage
//!
//! ```ignore
//! use ns_math::logging::{init_logging, LogConfig};
//!
//! let config = LogConfig::from_env(None, None);
//! init_logging(&config);
//! ```
//!
//! All output goes to stderr. Build summaries are logged at `debug`,
//! per-query interpolation at `trace`.

pub mod config;

pub use config::{LogConfig, LogFormat, LogLevel};

use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

/// Build the filter: RUST_LOG directives when the level came from them,
/// else `ns_math=<level>`.
fn build_filter(config: &LogConfig) -> EnvFilter {
    let from_level = || EnvFilter::new(format!("ns_math={}", config.level));
    match config.directives.as_deref() {
        Some(directives) => EnvFilter::try_new(directives).unwrap_or_else(|_| from_level()),
        None => from_level(),
    }
}

/// Install the global subscriber, failing if one is already set.
pub fn try_init_logging(config: &LogConfig) -> Result<(), TryInitError> {
    let filter = build_filter(config);

    match config.format {
        LogFormat::Human => {
            let use_ansi = std::io::stderr().is_terminal();
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(use_ansi);

            if config.timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer)
                    .try_init()
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer.without_time())
                    .try_init()
            }
        }
        LogFormat::Jsonl => {
            let json_layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(false);
            tracing_subscriber::registry()
                .with(filter)
                .with(json_layer)
                .try_init()
        }
    }
}

/// Initialize the logging subsystem.
///
/// Should be called once at startup; a second call only prints a warning.
pub fn init_logging(config: &LogConfig) {
    if let Err(err) = try_init_logging(config) {
        eprintln!("Warning: logging already initialized: {err}");
    }
}

/// Initialize logging from the environment (for tests and simple cases).
pub fn init_default_logging() {
    init_logging(&LogConfig::from_env(None, None));
}

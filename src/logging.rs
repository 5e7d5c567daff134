//! Logging and tracing initialization for the sensor.
//!
//! Standard output belongs to the PRTG document, so every log line goes to
//! stderr. Both pretty console output and JSON output are supported.

use tracing::Level;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Configuration for the logging system.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogConfig {
    /// Output logs as JSON (for machine parsing)
    pub json: bool,
    /// Enable verbose logging (sets default level to DEBUG)
    pub verbose: bool,
}

impl LogConfig {
    /// The filter used when `RUST_LOG` is not set.
    pub fn default_directive(&self) -> String {
        let level = if self.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        };
        format!("vbr_sensor={}", level.as_str().to_lowercase())
    }
}

/// Initialize the tracing subscriber with the given configuration.
///
/// Call once, after the configuration is loaded. The level can be
/// overridden at runtime via the `RUST_LOG` environment variable.
pub fn init(config: LogConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directive()));

    if config.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_current_span(true)
                    .with_target(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .init();
    }
}

//! # vmtoken Telemetry
//!
//! Structured logging for vmtoken host processes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vmtoken_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_telemetry(TelemetryConfig::from_env())?;
//!     // Events from every crate now reach the configured output
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `VT_SERVICE_NAME` | `vmtoken` | Service name in log lines |
//! | `VT_LOG_LEVEL` | `info` | Log level filter |
//! | `VT_JSON_LOGS` | `false` | JSON output (true inside containers) |
//! | `VT_CONSOLE_OUTPUT` | `true` | Write logs to stderr |

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{env_filter, init_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// A global subscriber is already installed or could not be built.
    #[error("Failed to initialize log subscriber: {0}")]
    SubscriberInit(String),

    /// The level filter could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging for the process.
///
/// Call once, early in `main`.
pub fn init_telemetry(config: TelemetryConfig) -> Result<(), TelemetryError> {
    logging::init_logging(&config)
}

/// Convenience macro for creating a span tagged with a token instance.
///
/// # Example
///
/// ```rust,ignore
/// use vmtoken_telemetry::token_span;
///
/// let _span = token_span!("apply", token = %id, action = "Transfer").entered();
/// ```
#[macro_export]
macro_rules! token_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}

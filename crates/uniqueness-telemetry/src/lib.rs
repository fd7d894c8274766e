//! # Uniqueness Telemetry
//!
//! Logging bootstrap for the uniqueness checker.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use uniqueness_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     init_logging(&config).expect("Failed to init logging");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `UC_SERVICE_NAME` | `uniqueness-checker` | Service name in log lines |
//! | `UC_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `UC_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `UC_JSON_LOGS` | `false` (`true` in containers) | JSON formatted logs |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),
}

/// Log a per-transaction event with the standard fields.
///
/// # Example
///
/// ```rust,ignore
/// use uniqueness_telemetry::log_check_event;
///
/// log_check_event!(info, tx_id, holding_identity, "Transaction certified");
/// ```
#[macro_export]
macro_rules! log_check_event {
    ($level:ident, $tx_id:expr, $holding_identity:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            tx_id = %$tx_id,
            holding_identity = %$holding_identity,
            $($($field)*,)?
            $msg
        )
    };
}

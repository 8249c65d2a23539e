//! Structured logging initialization.
//!
//! Logs go to stderr so command output on stdout stays machine readable.
//! The RUST_LOG environment variable takes precedence over the `--log-level` flag.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the logging subsystem.
///
/// Falls back to `warn` if `level` is not a valid filter directive.
pub fn init(level: &str) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .try_init();
}

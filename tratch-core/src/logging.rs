//! Structured logging via **tracing**.
//!
//! The discovery engine logs node-level recoveries (unresolved symbols,
//! malformed doc XML) at warn level and run statistics at info level.
//! Tracing macros queue events instead of writing I/O inline, so logging
//! from inside rayon workers stays cheap.

use tracing::{error, info, warn};

/// Initializes the global tracing collector (subscriber).
///
/// Call once at startup. Configures structured JSON output to stderr, so
/// stdout stays clean for the emitted records.
///
/// # Environment Variables
/// - `RUST_LOG`: Controls log filtering (e.g., `RUST_LOG=tratch=debug`)
pub fn init_structured_logging() {
    tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_current_span(true)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

/// Logs a warning event.
pub fn log_warn(message: &str) {
    warn!(detail = %message);
}

/// Logs an info event.
pub fn log_info(message: &str) {
    info!(detail = %message);
}

/// Logs an error event.
pub fn log_error(message: &str) {
    error!(detail = %message);
}

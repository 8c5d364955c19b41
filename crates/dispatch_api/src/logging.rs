//! Structured logging setup, shared by every binary that embeds the engine.

use tracing_subscriber::EnvFilter;

/// Install a `tracing` subscriber that writes to stderr and honors
/// `RUST_LOG`, defaulting to `info` when it isn't set.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}

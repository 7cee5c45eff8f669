//! Logging initialization.
//!
//! Events go to stderr so that stdout stays reserved for the JSON-RPC stream.

use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_level` (e.g. `"info"` or
/// `"markshelf=debug"`) is used. Calling this more than once is harmless.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

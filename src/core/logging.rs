//! Logging Setup
//!
//! All diagnostics go to stderr. Stdout is reserved for the JSON-RPC stream
//! in STDIO mode and for the human-readable report in supervisor commands.

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `default_directive` is used
/// (e.g. "info" for servers, "warn" for supervisor commands). Calling this
/// more than once is harmless.
pub fn init(default_directive: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}

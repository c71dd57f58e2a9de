//! Logging setup for the fitplan binary.
//!
//! Logs go to stderr so that proposal output on stdout stays parseable.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging; `verbose` lowers the default level to debug
///
/// `RUST_LOG` overrides the default level either way.
pub fn init(verbose: bool) {
    init_with_level(if verbose { "debug" } else { "info" })
}

/// Initialize logging with a specific default level
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();
}

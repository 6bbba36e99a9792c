//! Logging setup.
//!
//! Logs go to stderr so stdout stays clean for responses and JSON output.
//! `RUST_LOG` takes precedence over the verbosity flag.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Default level for the given verbosity flag.
pub fn default_level(verbose: bool) -> Level {
    if verbose { Level::DEBUG } else { Level::WARN }
}

/// Install the global subscriber.
///
/// Safe to call more than once; later calls are ignored.
pub fn init(verbose: bool) {
    let filter = EnvFilter::builder()
        .with_default_directive(default_level(verbose).into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

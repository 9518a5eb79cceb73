//! Structured logging to stderr via `tracing`. Verbosity comes from repeated
//! `-v` flags unless `BLOGOMATIC_LOG` holds an explicit filter.

use tracing_subscriber::EnvFilter;

/// The environment variable that overrides the verbosity flags.
pub const LOG_ENV: &str = "BLOGOMATIC_LOG";

/// Maps a `-v` count to a filter directive.
pub const fn verbosity_to_directive(verbosity: u64) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the global subscriber. Safe to call more than once.
pub fn init(verbosity: u64) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(verbosity_to_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr)
        .try_init();
}

//! Logging initialization: `tracing` + `tracing-subscriber`, verbosity
//! controlled by a `-v` count, with a config-file `log_level` as the
//! floor when no `-v` flags are given.

use tracing_subscriber::EnvFilter;

/// Initialize the global `tracing` subscriber.
///
/// `verbosity` is the number of `-v` flags the caller passed (0 = use
/// `default_level`, 1 = debug, 2+ = trace). `RUST_LOG`, if set, always
/// wins over both.
pub fn init(verbosity: u8, default_level: &str) {
    let level = match verbosity {
        0 => default_level,
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .ok();
}

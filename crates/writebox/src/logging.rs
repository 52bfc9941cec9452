//! Log output for the command-line front end.
//!
//! Filtering follows `RUST_LOG`, e.g. `RUST_LOG=writebox_core=debug`; the default is `warn`.
//! Logs go to stderr so they never mix with document output.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .init();
}

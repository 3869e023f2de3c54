//! Logging setup on top of `tracing-subscriber`.

use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global fmt subscriber.
///
/// The filter comes from `RUST_LOG` (e.g. `RUST_LOG=u_rota=debug`) and
/// defaults to `info`. Logs go to stderr so report output on stdout stays
/// machine-readable.
///
/// # Examples
/// ```no_run
/// u_rota::logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Debug-level subscriber for tests; safe to call more than once.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

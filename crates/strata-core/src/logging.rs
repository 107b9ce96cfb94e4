//! Logging setup built on `tracing-subscriber`.

use tracing_subscriber::EnvFilter;

/// Default filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,strata_panel=debug,strata_input=info";

/// Installs a global fmt subscriber.
///
/// `RUST_LOG` takes precedence over [`DEFAULT_FILTER`]. Does nothing if a
/// subscriber was already installed, so tests can call it repeatedly.
pub fn init() {
    init_with_filter(DEFAULT_FILTER);
}

/// Installs a global fmt subscriber with a custom fallback filter.
pub fn init_with_filter(filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

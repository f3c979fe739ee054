//! Tracing subscriber setup for the binary

use tracing_subscriber::EnvFilter;

/// Filter used when neither `WORKBENCH_LOG` nor `RUST_LOG` is set
pub const DEFAULT_FILTER: &str = "info";

/// Build the filter from `WORKBENCH_LOG`, then `RUST_LOG`, then the default
pub fn env_filter() -> EnvFilter {
    ["WORKBENCH_LOG", "RUST_LOG"]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find_map(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a global fmt subscriber writing to stderr
///
/// Safe to call more than once; later calls leave the first subscriber in
/// place.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

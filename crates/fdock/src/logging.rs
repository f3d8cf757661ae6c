//! Subscriber setup for applications. Library code only emits events.

use tracing_subscriber::EnvFilter;

/// Directive used when neither `RUST_LOG` nor an explicit filter is given.
pub const DEFAULT_FILTER: &str = "fdock=info";

/// Install a global fmt subscriber.
///
/// `RUST_LOG` wins over `filter`, which wins over [`DEFAULT_FILTER`].
/// Returns `false` if a global subscriber was already installed.
pub fn init(filter: Option<&str>) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter.unwrap_or(DEFAULT_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

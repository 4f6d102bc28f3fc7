//! JSON log output for the inventory binaries.
//!
//! The view-model logs task launches and ignored sells at `debug` and store
//! failures it swallows at `warn`; commands log their outcome at `info`. The
//! default filter therefore shows command outcomes and store failures only.
//! Set `RUST_LOG=debug` to follow individual writes.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Install the JSON subscriber.
///
/// Event fields are flattened into the top-level object so `scope`,
/// `item_id` and `error` can be queried directly. Returns quietly if a global
/// subscriber is already installed.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .flatten_event(true)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}

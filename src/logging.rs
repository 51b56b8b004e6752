//! Console diagnostics.
//!
//! Narration goes through `tracing` to stderr, filtered by `RUST_LOG` (default `info`).
//! The per-entity CSV audit trail in [`crate::audit`] is separate and not affected by
//! the filter.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

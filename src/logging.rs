//! `tracing` subscriber setup for the binary.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "info";

/// Route events to stderr, filtered by `RUST_LOG` or [`DEFAULT_FILTER`].
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(filter);

    tracing_subscriber::registry().with(stderr_layer).try_init()?;
    tracing::debug!(filter = DEFAULT_FILTER, "tracing ready");
    Ok(())
}

//! Log output for the `reposum` binary.
//!
//! Installs a `tracing_subscriber` registry that prints human-readable events
//! to stdout. The level defaults to `info` and follows `RUST_LOG` when set,
//! e.g. `RUST_LOG=reposum=debug` shows per-request fetch and reduce events.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339()),
        )
        .try_init()?;

    Ok(())
}

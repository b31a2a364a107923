use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::constants::DEFAULT_LOG_FILTER;

/// Install the global subscriber: `RUST_LOG` (or the default filter) and a compact console
/// format. Fails if a subscriber is already installed.
pub fn init_telemetry(environment: &str) -> anyhow::Result<()> {
    let console_fmt = tracing_subscriber::fmt::layer().event_format(
        Format::default()
            .compact()
            .with_target(false)
            .without_time(),
    );
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(console_fmt)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    tracing::info!(environment, "Tracing initialized");
    Ok(())
}

//! Logging setup shared by every EdgeSync binary.

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. `filter` uses `RUST_LOG` syntax; an invalid filter
/// falls back to `info`.
pub fn init_logging(filter: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
}

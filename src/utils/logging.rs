//! Logging initialization
//!
//! Builds the tracing subscriber from the logging settings. Host processes
//! call this once at startup; the env filter still wins when set.

use crate::config::LoggingSettings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber
///
/// The `RUST_LOG` environment variable overrides the configured level;
/// verbose mode raises the default to `debug`.
pub fn init_logging(settings: &LoggingSettings) {
    let default_level = if settings.verbose {
        "debug".to_string()
    } else {
        settings.level.clone()
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&default_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

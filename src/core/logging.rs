//! Tracing subscriber setup
//!
//! `RUST_LOG` takes precedence over the configured level when it is set.

use crate::core::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// Returns `false` if a subscriber was already installed, which happens when
/// tests or an embedding binary set one up first.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = if config.format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.is_ok()
}

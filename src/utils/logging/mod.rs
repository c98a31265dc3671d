//! Tracing bootstrap and log sanitization

mod sanitization;

pub use sanitization::{redact_url, sanitize_log_data};

use crate::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. Returns `false` when a subscriber
/// was already installed, which is common in tests and embedding hosts.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let result = if config.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(false)
            .try_init()
    };

    result.is_ok()
}

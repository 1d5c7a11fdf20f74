//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once at startup
//! - Honor `RUST_LOG` when set, the configured level otherwise
//! - JSON output for production aggregation, pretty lines for development

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::schema::ObservabilityConfig;

/// Initialize logging from the loaded configuration.
pub fn init(config: &ObservabilityConfig) {
    init_with(&config.log_level, config.log_json);
}

/// Minimal logging for the path where configuration never loaded.
pub fn init_fallback() {
    init_with("info", false);
}

fn init_with(default_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));

    let registry = tracing_subscriber::registry().with(filter);

    // try_init so a second call (fallback after partial startup) is a no-op
    // instead of a panic.
    if json {
        let _ = registry.with(tracing_subscriber::fmt::layer().json()).try_init();
    } else {
        let _ = registry.with(tracing_subscriber::fmt::layer()).try_init();
    }
}

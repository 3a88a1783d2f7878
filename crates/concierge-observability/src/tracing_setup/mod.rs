//! Tracing setup: subscriber installation, span macros and event helpers.

pub mod events;
pub mod spans;

use std::sync::Once;

use concierge_core::config::ObservabilityConfig;
use tracing_subscriber::EnvFilter;

/// Environment variable read for the log filter.
pub const LOG_ENV: &str = "CONCIERGE_LOG";

static INIT: Once = Once::new();

/// Install the global subscriber.
///
/// `CONCIERGE_LOG` takes precedence over `config.log_level`. Output is JSON
/// lines when `config.json_logs` is set. Only the first call has an effect.
pub fn init_tracing(config: &ObservabilityConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true);

        // Another subscriber may already be installed by the host process.
        let _ = if config.json_logs {
            builder.json().with_current_span(true).try_init()
        } else {
            builder.try_init()
        };
    });
}

/// Install a JSON subscriber with an explicit filter string (tests, embedding).
pub fn init_tracing_with_filter(filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(true)
        .json()
        .try_init();
}

//! Log setup: `log` records are bridged into a tracing fmt subscriber

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "portal_lib=info,portal_flow=info";

fn env_filter() -> EnvFilter {
    EnvFilter::builder()
        .parse_lossy(std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_DIRECTIVE.to_string()))
}

/// Install the global subscriber. `RUST_LOG` replaces the default directive.
pub fn init() -> Result<(), String> {
    tracing_log::LogTracer::init().map_err(|e| format!("Failed to bridge log records: {}", e))?;

    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_target(true)
        .with_env_filter(env_filter())
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| format!("Failed to install log subscriber: {}", e))
}

use std::env;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the logging system with environment-based configuration
///
/// The log level can be configured via environment variables:
/// - `RUST_LOG`: Standard Rust logging configuration (e.g., "debug", "info", "warn", "error")
/// - `SPLIT_ROUTER_LOG`: router-specific configuration (overrides RUST_LOG if set)
///
/// Module-specific filtering works as usual:
/// - `SPLIT_ROUTER_LOG=info,split_router::simulator=debug`
///
/// Set `json` to emit one JSON object per line instead of the compact format.
pub fn init_logging(json: bool) {
    // Try to load .env file if it exists
    let _ = dotenv::dotenv();

    let filter = match env::var("SPLIT_ROUTER_LOG") {
        Ok(router_log) => router_log,
        Err(_) => env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
    };

    let env_filter = EnvFilter::try_new(&filter)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // Logs go to stderr so stdout stays clean for JSON results
    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_level(true)
                    .with_ansi(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    }

    tracing::debug!(log_filter = %filter, json, "Logging system initialized");
}

pub mod cli;
pub mod config;
pub mod diagnostic;
pub mod mcp;
pub mod models;
pub mod pipeline;
pub mod pipeline_config;
pub mod report;

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Logs go to stderr so stdout stays for reports.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();
}

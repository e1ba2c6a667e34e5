//! Diagnostic logging for the CLI.
//!
//! Logs go to stderr so stdout carries only the requested output format.

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` wins, otherwise `log_level` applies to our
/// crates and everything else stays at `warn`.
fn build_filter(log_level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::new(format!(
        "warn,peer_valuation_core={log_level},pval={log_level}"
    ))
}

/// Install the global subscriber. Safe to call more than once.
pub fn init_logging(log_level: &str) {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .with_target(true)
        .with_file(false)
        .with_line_number(false);

    let _ = tracing_subscriber::registry()
        .with(build_filter(log_level))
        .with(fmt_layer)
        .try_init();

    tracing::debug!(log_level = %log_level, "logging initialized");
}

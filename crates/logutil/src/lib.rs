//! Utilities for logging.
//!
//! Libraries in the workspace only emit `tracing` events. Binaries and tests
//! decide where those events go by installing a subscriber through this
//! crate.

use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable output, one event per line.
    #[default]
    Compact,
    /// Newline delimited json.
    Json,
}

/// Build the filter used by all subscribers.
///
/// `RUST_LOG` takes precedence over the provided default level.
fn env_filter(default_level: Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy()
}

/// Install a global subscriber writing to stderr.
///
/// Returns false if a global subscriber was already installed.
pub fn configure_global_logger(default_level: Level, format: LogFormat) -> bool {
    let builder = FmtSubscriber::builder()
        .with_env_filter(env_filter(default_level))
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true);

    let result = match format {
        LogFormat::Compact => tracing::subscriber::set_global_default(builder.compact().finish()),
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
    };

    result.is_ok()
}

/// Install a subscriber suitable for tests.
///
/// Output is captured by the test harness. Safe to call from every test,
/// only the first call installs anything.
pub fn init_test() {
    let subscriber = FmtSubscriber::builder()
        .with_test_writer()
        .with_env_filter(env_filter(Level::DEBUG))
        .with_file(true)
        .with_line_number(true)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_test_is_idempotent() {
        init_test();
        init_test();
        tracing::debug!("logging initialized");
    }

    #[test]
    fn second_global_install_reports_failure() {
        init_test();
        assert!(!configure_global_logger(Level::INFO, LogFormat::Json));
    }
}

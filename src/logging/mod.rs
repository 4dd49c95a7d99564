//! Logging initialization with environment-based formatters
//!
//! - Production: Structured JSON logs for cloud monitoring
//! - Sandbox: Colorful, human-readable logs for development
//! - Syslog mode: everything goes to the system journal instead

use crate::config::get_environment;
use crate::error::NotifyError;
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Initialize logging for one process invocation.
///
/// When `syslog` is set the subscriber writes to the system journal under
/// the `cryptonotify` identifier; failing to reach the journal is a startup
/// error. Otherwise the format follows the environment: JSON in production,
/// colorful human-readable logs everywhere else.
pub fn init_logging(syslog: bool) -> Result<(), NotifyError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if syslog {
        let journal = tracing_journald::layer()
            .map_err(|e| {
                NotifyError::configuration(format!("cannot connect to the system journal: {}", e))
            })?
            .with_syslog_identifier("cryptonotify".to_string());
        tracing_subscriber::registry()
            .with(env_filter)
            .with(journal)
            .init();
        return Ok(());
    }

    let env = get_environment();
    let is_production = matches!(env.as_str(), "production" | "prod");

    if is_production {
        // Production: Structured JSON logs
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(std::io::stdout),
            )
            .init();
    } else {
        // Sandbox/Development: Colorful, human-readable logs
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_ansi(true)
                    .with_writer(std::io::stdout),
            )
            .init();
    }

    Ok(())
}

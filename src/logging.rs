//! Logging configuration using the tracing framework
//!
//! Logs go to stderr so command output on stdout stays clean. The level is
//! controlled via the RUST_LOG environment variable.

use std::path::Path;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "dispatch_board=info,warn";

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("dispatch_board=debug,dispatch=debug,info")
        } else {
            EnvFilter::new(DEFAULT_FILTER)
        }
    })
}

/// Initialize the logging system
///
/// # Environment Variables
///
/// - `RUST_LOG`: Controls log level (e.g., "debug", "info", "warn", "error")
///   - Default: "dispatch_board=info,warn"
///   - Examples:
///     - `RUST_LOG=dispatch_board::engine=debug` - Duration calculations
///     - `RUST_LOG=dispatch_board::board=debug` - Board state changes
///
/// # Examples
///
/// ```no_run
/// use dispatch_board::logging;
///
/// logging::init(false);
/// tracing::info!("Board loaded");
/// ```
pub fn init(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_line_number(true)
                .with_file(false),
        )
        .init();
}

/// Initialize logging with an additional daily rolling file in `log_dir`
pub fn init_with_file(
    log_dir: &Path,
    log_file_name: &str,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};

    std::fs::create_dir_all(log_dir)?;
    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, log_file_name);

    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_writer(file_appender).with_ansi(false))
        .try_init()?;

    Ok(())
}

/// Initialize logging for tests
///
/// Only errors are shown unless RUST_LOG says otherwise.
pub fn init_test() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_test_writer())
        .try_init()
        .ok(); // Ignore errors if already initialized
}

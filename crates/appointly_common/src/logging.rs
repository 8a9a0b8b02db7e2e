//! Logging utilities for the Appointly application.
//!
//! Every crate logs through the `tracing` macros; this module owns the one place
//! where the global subscriber is installed.

use appointly_config::LoggingConfig;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber at INFO level, console only.
///
/// # Examples
///
/// ```
/// use appointly_common::logging;
///
/// logging::init();
/// ```
pub fn init() {
    init_with_level(Level::INFO, None);
}

/// Initialize the tracing subscriber from the `[logging]` configuration section.
///
/// An unknown level string falls back to INFO. The returned guard must be kept
/// alive for as long as file logging is wanted; dropping it flushes the writer.
pub fn init_from_config(config: &LoggingConfig) -> Option<WorkerGuard> {
    let parsed = parse_level(&config.level);
    let level = parsed.unwrap_or(Level::INFO);
    let guard = init_with_level(level, config.directory.as_deref().map(Path::new));
    if parsed.is_none() {
        warn!("Unknown log level '{}', using {}", config.level, level);
    }
    guard
}

fn parse_level(raw: &str) -> Option<Level> {
    Level::from_str(raw.trim()).ok()
}

/// Initialize the tracing subscriber with a specific log level.
///
/// Console output always carries timestamps, levels, targets and file/line
/// information. When `log_dir` is given, a daily rolling `appointly.log` file is
/// written there as well.
///
/// # Arguments
///
/// * `level` - The minimum log level for the `appointly` targets.
/// * `log_dir` - Optional directory for the rolling log file.
pub fn init_with_level(level: Level, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::from_default_env().add_directive(
        format!("appointly={}", level)
            .parse()
            .unwrap_or_else(|_| LevelFilter::from_level(level).into()),
    );

    let console_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_thread_names(true);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "appointly.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    // try_init: a global subscriber may already be installed (tests, embedding).
    let result = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
    guard
}

/// Log a result, with different messages for success and error cases.
///
/// Returns the original result so it can be used in a chain.
pub fn log_result<T, E: std::fmt::Display>(
    result: Result<T, E>,
    success_message: &str,
    error_context: &str,
) -> Result<T, E> {
    match &result {
        Ok(_) => info!("{}", success_message),
        Err(e) => tracing::error!("{}: {}", error_context, e),
    }
    result
}

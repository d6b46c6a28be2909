use std::path::Path;
use std::sync::OnceLock;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Where log output goes besides the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    ConsoleOnly,
    /// Console plus a daily rolling file `<prefix>.<date>.log` in `dir`.
    ConsoleAndFile { dir: &'a Path, prefix: &'a str },
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `base_level`. Warnings and errors go to
/// stderr, everything else to stdout.
///
/// # Panics
/// Panics if the filter is invalid or a subscriber is already installed.
pub fn setup_logging(base_level: &str, target: LogTarget<'_>) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(base_level))
        .unwrap_or_else(|e| panic!("Invalid log filter: {}", e));

    let console_writer = std::io::stderr
        .with_max_level(Level::WARN)
        .or_else(std::io::stdout);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(true)
        .with_writer(console_writer);

    let file_layer = match target {
        LogTarget::ConsoleOnly => None,
        LogTarget::ConsoleAndFile { dir, prefix } => {
            std::fs::create_dir_all(dir)
                .unwrap_or_else(|e| panic!("Failed to create logs directory: {}", e));

            let file_appender = tracing_appender::rolling::Builder::new()
                .rotation(tracing_appender::rolling::Rotation::DAILY)
                .filename_prefix(prefix)
                .filename_suffix("log")
                .max_log_files(5)
                .build(dir)
                .unwrap_or_else(|e| panic!("Failed to create log file appender: {}", e));

            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            LOG_GUARD.set(guard).expect("Logging already initialized");

            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_ansi(false)
                    .with_writer(file_writer),
            )
        }
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .unwrap_or_else(|e| panic!("Logger initialization failed: {}", e));
}

//! Log output for the gateway: stderr plus an appended log file.
//!
//! Filtering is configurable via `RUST_LOG`; by default the crumpit crates
//! log at `debug`, so every failure converted into an envelope is recorded.

use std::{io, path::Path};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// File name of the log written next to the process.
pub const DEFAULT_LOG_FILE: &str = "api.log";

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,crumpit_gateway=debug,crumpit_backends=debug,crumpit_core=debug";

/// Keeps the background log-file writer alive; dropping it flushes the file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Install the global subscriber writing to stderr and to `log_dir/log_file`.
///
/// The file is appended to, never truncated.
///
/// # Errors
/// Returns an error if `log_dir` cannot be created.
pub fn init_logging(log_dir: &Path, log_file: &str) -> Result<LoggingGuard, io::Error> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer().with_writer(non_blocking_file).with_ansi(false);
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(io::stderr);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry().with(env_filter).with(file_layer).with(stderr_layer).init();

    Ok(LoggingGuard { _file_guard: file_guard })
}

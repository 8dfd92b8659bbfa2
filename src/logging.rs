//! Tracing subscriber setup.
//!
//! CLI commands log to stderr. The TUI owns the terminal, so while it runs
//! logs go to a file instead.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

fn default_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Build the filter from `RUST_LOG`, falling back to warn (debug when verbose)
pub fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level(verbose)))
}

/// Colored stderr logging for one-shot commands
pub fn init_stderr(verbose: bool) {
    let stderr_layer = fmt::layer()
        .with_target(verbose)
        .with_ansi(std::io::IsTerminal::is_terminal(&std::io::stderr()))
        .with_writer(std::io::stderr)
        .with_filter(env_filter(verbose));

    // A second init (e.g. in tests) is harmless
    let _ = tracing_subscriber::registry().with(stderr_layer).try_init();
}

/// File logging for the TUI. Keep the returned guard alive until exit so
/// buffered lines are flushed.
pub fn init_file(path: &Path, verbose: bool) -> Result<WorkerGuard> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = path
        .file_name()
        .context("Log file path has no file name")?;

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory at {}", dir.display()))?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(non_blocking_file)
        .with_filter(env_filter(verbose));

    let _ = tracing_subscriber::registry().with(file_layer).try_init();
    Ok(guard)
}

//! Global logger setup. A render is driven by library callers (not a CLI
//! owned by this crate), so this just wires up a `slog` drain and installs
//! it as the `slog_scope` global; callers can ignore it entirely and the
//! bare `info!`/`debug!`/`warn!`/`error!` macros used throughout the crate
//! fall back to `slog_scope`'s no-op discard.

use std::fs::OpenOptions;
use std::path::Path;

use slog::{Drain, Level, Logger};

/// Install a file-backed logger at `path`, filtered to `level`, as the
/// process-wide `slog_scope` logger. Returns a guard: dropping it restores
/// whatever logger was previously installed.
pub fn configure_logger(path: &Path, level: Level) -> slog_scope::GlobalLoggerGuard {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .expect("failed to open log file");

    let decorator = slog_term::PlainSyncDecorator::new(file);
    let drain = slog_term::FullFormat::new(decorator).build().filter_level(level).fuse();
    let log = Logger::root(drain, o!("version" => env!("CARGO_PKG_VERSION")));

    slog_scope::set_global_logger(log)
}

/// Logger that discards everything; useful for tests and callers that have
/// no interest in render diagnostics.
pub fn null_logger() -> slog_scope::GlobalLoggerGuard {
    let log = Logger::root(slog::Discard, o!());
    slog_scope::set_global_logger(log)
}

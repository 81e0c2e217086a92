//! Tracing initialization.
//! Builds a subscriber with EnvFilter, compact or JSON output on stderr, and
//! optional file logging.
//!
//! Behavior:
//! - Log level comes from LogLevel only; RUST_LOG is not consulted.
//! - stdout stays free for prompts and results.
//! - A log file whose path has a symlinked ancestor is refused.

use anyhow::Result;
use chrono::Local;
use dirlink::output as out;
use dirlink::platform::open_log_file_secure_append;
use dirlink::{path_has_symlink_ancestor, LogLevel};
use std::fmt as stdfmt;
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt as tsfmt;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry;
use tracing_subscriber::util::SubscriberInitExt;

/// Human-friendly timestamp formatter (DD/MM/YY HH:MM:SS)
struct LocalHumanTime;
impl FormatTime for LocalHumanTime {
    fn format_time(&self, w: &mut tsfmt::format::Writer<'_>) -> stdfmt::Result {
        write!(w, "{}", Local::now().format("%d/%m/%y %H:%M:%S"))
    }
}

#[inline]
fn to_level_filter(lvl: &LogLevel) -> LevelFilter {
    match lvl {
        LogLevel::Quiet => LevelFilter::ERROR,
        LogLevel::Normal => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::TRACE,
    }
}

/// Open the log file for non-blocking appends, or explain on stderr why not.
fn maybe_open_non_blocking_writer(path: &Path) -> Option<(NonBlocking, WorkerGuard)> {
    match path_has_symlink_ancestor(path) {
        Ok(false) => {}
        Ok(true) => {
            out::print_warn(&format!(
                "Refusing to log to {}: an ancestor is a symlink.",
                path.display()
            ));
            return None;
        }
        Err(e) => {
            out::print_warn(&format!("Could not check log path {}: {e:#}", path.display()));
            return None;
        }
    }

    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    match open_log_file_secure_append(path) {
        Ok(file) => Some(tracing_appender::non_blocking(file)),
        Err(e) => {
            out::print_warn(&format!("{e}; logging to stderr only."));
            None
        }
    }
}

/// Initialize tracing. The returned guard flushes the file writer on drop and
/// must be held until exit.
pub fn init_tracing(
    lvl: &LogLevel,
    log_file: Option<&Path>,
    json: bool,
) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::default().add_directive(to_level_filter(lvl).into());
    let file = log_file.and_then(maybe_open_non_blocking_writer);

    // Layer types differ between the JSON and compact branches, so each
    // branch builds its own registry.
    let guard = if json {
        let stderr_layer = tsfmt::layer()
            .event_format(tsfmt::format().json())
            .with_timer(LocalHumanTime)
            .with_target(true)
            .with_writer(std::io::stderr);
        match file {
            Some((writer, guard)) => {
                let file_layer = tsfmt::layer()
                    .event_format(tsfmt::format().json())
                    .with_timer(LocalHumanTime)
                    .with_target(true)
                    .with_writer(writer);
                registry()
                    .with(env_filter)
                    .with(stderr_layer)
                    .with(file_layer)
                    .try_init()?;
                Some(guard)
            }
            None => {
                registry().with(env_filter).with(stderr_layer).try_init()?;
                None
            }
        }
    } else {
        let stderr_layer = tsfmt::layer()
            .with_timer(LocalHumanTime)
            .with_target(false)
            .with_ansi(atty::is(atty::Stream::Stderr))
            .compact()
            .with_writer(std::io::stderr);
        match file {
            Some((writer, guard)) => {
                let file_layer = tsfmt::layer()
                    .with_timer(LocalHumanTime)
                    .with_target(true)
                    .with_ansi(false)
                    .compact()
                    .with_writer(writer);
                registry()
                    .with(env_filter)
                    .with(stderr_layer)
                    .with(file_layer)
                    .try_init()?;
                Some(guard)
            }
            None => {
                registry().with(env_filter).with(stderr_layer).try_init()?;
                None
            }
        }
    };
    Ok(guard)
}

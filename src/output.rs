use owo_colors::OwoColorize;

use crate::errors::RelocationError;

/// Small wrapper around stdout/stderr printing to provide consistent, colored
/// user-facing messages. Colors are enabled only when output is a TTY.
fn is_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

pub fn print_info(msg: &str) {
    if is_tty() {
        println!("{} {}", "info:".cyan().bold(), msg);
    } else {
        println!("info: {}", msg);
    }
}

pub fn print_warn(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "warn:".yellow().bold(), msg);
    } else {
        eprintln!("warn: {}", msg);
    }
}

pub fn print_error(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "error:".red().bold(), msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

pub fn print_success(msg: &str) {
    if is_tty() {
        println!("{} {}", "ok:".green().bold(), msg);
    } else {
        println!("ok: {}", msg);
    }
}

/// Print a plain user-facing line (no prefix).
pub fn print_user(msg: &str) {
    println!("{}", msg);
}

/// Plain-text account of a failure: stage, message, and what is on disk.
pub fn failure_report(err: &RelocationError) -> String {
    let state = err.filesystem_state();
    format!(
        "{} failed: {}\n{}: {}",
        err.stage(),
        err,
        if state.needs_manual_cleanup() {
            "manual action required"
        } else {
            "filesystem"
        },
        state.summary()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ValidationFailure;
    use std::path::PathBuf;

    #[test]
    fn report_states_stage_and_filesystem() {
        let err = RelocationError::Validation {
            failure: ValidationFailure::SourceMissing,
            path: PathBuf::from("/nope"),
        };
        let report = failure_report(&err);
        assert!(report.starts_with("validation failed: source missing: /nope"));
        assert!(report.contains("nothing was moved"));
    }

    #[test]
    fn report_flags_manual_cleanup() {
        let err = RelocationError::Rollback {
            source_path: PathBuf::from("/data/big"),
            destination: PathBuf::from("/archive/big"),
            link_detail: "denied".into(),
            detail: "busy".into(),
            source: std::io::Error::from(std::io::ErrorKind::Other),
        };
        let report = failure_report(&err);
        assert!(report.starts_with("rollback failed"));
        assert!(report.contains("manual action required"));
    }
}

//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Notes:
//! - With no SOURCE the interactive line-prompt session starts.
//! - --debug is a shorthand for --log-level debug.

use clap::{Parser, ValueHint};
use std::path::{Path, PathBuf};

use crate::config::types::{Config, LogLevel};
use crate::relocate::RelocationRequest;

/// Move a directory elsewhere and leave a symlink in its place.
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Relocate a directory and leave a symlink behind",
    after_help = "Run without SOURCE to start an interactive session that can also undo the last relocation."
)]
pub struct Args {
    /// Directory (or file) to relocate.
    #[arg(value_name = "SOURCE", value_hint = ValueHint::AnyPath, requires = "destination")]
    pub source: Option<PathBuf>,

    /// New path for SOURCE (or its new parent with --into).
    #[arg(value_name = "DESTINATION", value_hint = ValueHint::AnyPath)]
    pub destination: Option<PathBuf>,

    /// Treat DESTINATION as a parent directory; SOURCE keeps its name.
    #[arg(long)]
    pub into: bool,

    /// Answer yes to every confirmation.
    #[arg(short = 'y', long, requires = "source")]
    pub yes: bool,

    /// Create a missing destination parent without asking.
    #[arg(short = 'p', long)]
    pub create_parents: bool,

    /// Validate and show what would be done, but do not modify anything.
    #[arg(long, requires = "source")]
    pub dry_run: bool,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(short = 'd', long, help = "Enable debug logging (shorthand for --log-level debug)")]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Emit logs in structured JSON.
    #[arg(long, help = "Emit logs in structured JSON")]
    pub json: bool,

    /// Print the config file location used by dirlink and exit.
    #[arg(long)]
    pub print_config: bool,

    /// Write a template config file at the config location and exit.
    #[arg(long, conflicts_with = "print_config")]
    pub init_config: bool,
}

impl Args {
    /// The one-shot request, if SOURCE and DESTINATION were given.
    pub fn request(&self) -> Option<RelocationRequest> {
        let source = sanitize_path(self.source.as_deref()?);
        let destination = sanitize_path(self.destination.as_deref()?);
        Some(if self.into {
            RelocationRequest::into_parent(source, destination)
        } else {
            RelocationRequest::explicit(source, destination)
        })
    }

    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if self.create_parents {
            cfg.create_parents = true;
        }
        if self.dry_run {
            cfg.dry_run = true;
        }
        if self.yes {
            cfg.assume_yes = true;
        }
    }
}

fn sanitize_path(p: &Path) -> PathBuf {
    sanitize_str(&p.to_string_lossy())
}

/// Clean a path typed or pasted by a user.
///
/// Trims whitespace and surrounding single/double quotes (PowerShell, CMD
/// and "copy as path" add them), drops stray embedded quotes, and removes one
/// trailing separator unless the path is a root.
pub fn sanitize_str(s: &str) -> PathBuf {
    let trimmed = s.trim();
    let mut inner = if trimmed.len() >= 2
        && ((trimmed.starts_with('"') && trimmed.ends_with('"'))
            || (trimmed.starts_with('\'') && trimmed.ends_with('\'')))
    {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.trim_matches(|c| c == '\'' || c == '"').to_string()
    };

    inner.retain(|c| c != '\'' && c != '"');

    if (inner.ends_with('\\') || inner.ends_with('/'))
        && inner.len() > 1
        && !inner.ends_with(":\\")
        && !inner.ends_with(":/")
    {
        inner.pop();
    }

    PathBuf::from(inner)
}

pub fn parse() -> Args {
    Args::parse()
}

//! I/O helper utilities.
//!
//! Provides small adapters to enrich io::Error with actionable context/hints,
//! usable with map_err in both io::Result and anyhow::Result code paths.
//!
//! Usage:
//!   // in functions returning anyhow::Result<_>
//!   fs::create_dir_all(dir).map_err(io_error_with_help("create dir", dir))?;
//!
//!   // in functions returning io::Result<_>
//!   File::open(p).map_err(io_error_with_help_io("open file", p))?;
//!
//! The relocation engine calls [`describe_io`] directly to build the
//! `detail` text carried by its typed errors.

use anyhow::anyhow;
use std::io;
use std::path::Path;

/// Format a human-friendly message with op/path plus platform-aware hints.
pub fn describe_io(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", op, path.display(), e);

    if let Some(code) = e.raw_os_error() {
        #[cfg(unix)]
        {
            match code {
                libc::EACCES | libc::EPERM => {
                    msg.push_str(" (permission denied; check ownership and write permissions)");
                }
                libc::EXDEV => {
                    msg.push_str(" (cross-filesystem; relocating across volumes is not supported)");
                }
                libc::EBUSY => {
                    msg.push_str(" (resource busy; close programs using this path)");
                }
                libc::ENOENT => {
                    msg.push_str(" (path not found; verify it exists)");
                }
                libc::EEXIST | libc::ENOTEMPTY => {
                    msg.push_str(" (already exists; pick another destination)");
                }
                libc::EINVAL => {
                    msg.push_str(" (invalid move; a directory cannot be moved inside itself)");
                }
                libc::ENOSPC => {
                    msg.push_str(" (insufficient space on device)");
                }
                libc::EROFS => {
                    msg.push_str(" (read-only filesystem; cannot write here)");
                }
                libc::ELOOP => {
                    msg.push_str(" (too many symbolic link levels; possible symlink cycle)");
                }
                libc::ENAMETOOLONG => {
                    msg.push_str(" (filename or path too long; shorten path segments)");
                }
                _ => {}
            }
        }
        #[cfg(windows)]
        {
            match code {
                5 => msg.push_str(" (access denied; check permissions)"),
                17 => msg.push_str(" (not same device; relocating across volumes is not supported)"),
                32 => msg.push_str(" (sharing violation; a program is using this path)"),
                2 | 3 => msg.push_str(" (path not found; verify it exists)"),
                80 | 183 => msg.push_str(" (already exists; pick another destination)"),
                112 => msg.push_str(" (insufficient disk space)"),
                206 => msg.push_str(" (filename or path too long)"),
                1314 => msg.push_str(" (symbolic link privilege not held)"),
                _ => {}
            }
        }
        msg.push_str(&format!(" [os code: {}]", code));
    } else {
        match e.kind() {
            io::ErrorKind::PermissionDenied => {
                msg.push_str(" (permission denied; check ownership and write permissions)");
            }
            io::ErrorKind::NotFound => {
                msg.push_str(" (path not found; verify it exists)");
            }
            io::ErrorKind::AlreadyExists => {
                msg.push_str(" (already exists; pick another destination)");
            }
            _ => {}
        }
    }

    msg
}

/// Adapter for anyhow::Result code.
/// Returns a closure suitable for `.map_err(...)` that converts io::Error -> anyhow::Error.
pub fn io_error_with_help<'a>(
    op: &'a str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> anyhow::Error + 'a {
    move |e: io::Error| anyhow!(describe_io(op, path, &e))
}

/// Adapter for io::Result code (when the surrounding function returns io::Result).
/// Preserves the original ErrorKind.
pub fn io_error_with_help_io<'a>(
    op: &'a str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> io::Error + 'a {
    move |e: io::Error| io::Error::new(e.kind(), describe_io(op, path, &e))
}

//! Windows implementations of platform helpers (best-effort, minimal ACL awareness).
//!
//! Notes:
//! - Windows lacks POSIX mode semantics; we do not attempt ACL management here.
//! - Symlinks are typed: a directory link must be created with `symlink_dir`
//!   and removed with `remove_dir`.
//! - Creating symlinks needs SeCreateSymbolicLinkPrivilege (elevation) unless
//!   Developer Mode is enabled.

use anyhow::{bail, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use windows_sys::Win32::Foundation::{ERROR_ACCESS_DENIED, ERROR_PRIVILEGE_NOT_HELD};

use super::temp_sibling;
use crate::fs_ops::io_error_with_help_io;

/// Create a symbolic link at `link` pointing to `target`, marking it as a
/// directory link when `is_dir` is set.
pub fn create_symlink(target: &Path, link: &Path, is_dir: bool) -> io::Result<()> {
    if is_dir {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}

/// Remove the symbolic link at `link` (never its target).
pub fn remove_symlink(link: &Path, is_dir: bool) -> io::Result<()> {
    if is_dir {
        fs::remove_dir(link)
    } else {
        fs::remove_file(link)
    }
}

/// Advisory text for symlink failures caused by missing privileges.
pub fn symlink_privilege_hint(err: &io::Error) -> Option<&'static str> {
    const HINT: &str =
        "Windows requires administrator rights (or Developer Mode) to create symbolic links; re-run from an elevated prompt";
    match err.raw_os_error() {
        Some(code) if code as u32 == ERROR_PRIVILEGE_NOT_HELD || code as u32 == ERROR_ACCESS_DENIED => {
            Some(HINT)
        }
        _ if err.kind() == io::ErrorKind::PermissionDenied => Some(HINT),
        _ => None,
    }
}

/// Open log file for appending (best-effort; no symlink defense available via std on Windows).
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_error_with_help_io("open log file", path))
}

/// Write a new config file atomically (create_new) using a temp file + rename.
/// Fails if the target already exists. Best-effort security (no ACL changes).
pub fn write_config_secure_new_0600(path: &Path, contents: &[u8]) -> Result<()> {
    if path.exists() {
        bail!("Config file already exists: {}", path.display());
    }
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "config path has no parent"))?;
    fs::create_dir_all(parent)?;

    let tmp: PathBuf = temp_sibling(path);
    let mut f = OpenOptions::new().write(true).create_new(true).open(&tmp)?;
    f.write_all(contents)?;
    f.sync_all()?;
    drop(f);
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

/// No-op on Windows; POSIX-style directory modes are not applicable.
pub fn set_dir_mode_0700(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// No-op on Windows; POSIX-style file modes are not applicable.
pub fn set_file_mode_0600(_path: &Path) -> io::Result<()> {
    Ok(())
}

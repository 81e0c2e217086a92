//! Unix implementations of platform helpers.

use super::common_unix::atomic_write_new_0600;
use crate::fs_ops::io_error_with_help_io;
use anyhow::Result;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::Path;

/// Create a symbolic link at `link` pointing to `target`.
///
/// Unix symlinks carry no file/directory distinction, so `is_dir` is ignored.
pub fn create_symlink(target: &Path, link: &Path, _is_dir: bool) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

/// Remove the symbolic link at `link` (never its target).
pub fn remove_symlink(link: &Path, _is_dir: bool) -> io::Result<()> {
    fs::remove_file(link)
}

/// Advisory text for symlink failures caused by missing permissions.
pub fn symlink_privilege_hint(err: &io::Error) -> Option<&'static str> {
    const HINT: &str =
        "creating the link needs write permission on the source's parent directory; check its ownership and mode";
    match err.raw_os_error() {
        Some(libc::EPERM) | Some(libc::EACCES) => Some(HINT),
        _ if err.kind() == io::ErrorKind::PermissionDenied => Some(HINT),
        _ => None,
    }
}

/// Open log file for appending; set 0600 only when creating a new file.
/// If the file already exists, we preserve its existing permissions to avoid
/// clobbering administrator adjustments (e.g. group-readable for log shipping).
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let existed = path.exists();
    let f = OpenOptions::new()
        .create(true)
        .append(true)
        .mode(0o600) // applies on create
        .open(path)
        .map_err(io_error_with_help_io("open log file", path))?;
    if !existed {
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
    }
    Ok(f)
}

/// Write a new config file atomically with mode 0600. Fails if it already exists.
pub fn write_config_secure_new_0600(path: &Path, contents: &[u8]) -> Result<()> {
    atomic_write_new_0600(path, contents)
}

/// POSIX chmod 0700 for directories.
pub fn set_dir_mode_0700(path: &Path) -> io::Result<()> {
    fs::set_permissions(path, fs::Permissions::from_mode(0o700))
}

/// POSIX chmod 0600 for files.
pub fn set_file_mode_0600(path: &Path) -> io::Result<()> {
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn symlink_roundtrip_leaves_target_alone() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("real");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("f.txt"), b"x").unwrap();
        let link = dir.path().join("link");

        create_symlink(&target, &link, true).unwrap();
        let meta = fs::symlink_metadata(&link).unwrap();
        assert!(meta.file_type().is_symlink());
        assert_eq!(fs::read_link(&link).unwrap(), target);
        assert_eq!(fs::read(link.join("f.txt")).unwrap(), b"x");

        remove_symlink(&link, true).unwrap();
        assert!(fs::symlink_metadata(&link).is_err());
        assert!(target.join("f.txt").exists());
    }

    #[test]
    fn privilege_hint_only_for_permission_errors() {
        assert!(symlink_privilege_hint(&io::Error::from_raw_os_error(libc::EPERM)).is_some());
        assert!(symlink_privilege_hint(&io::Error::from_raw_os_error(libc::EACCES)).is_some());
        assert!(symlink_privilege_hint(&io::Error::from_raw_os_error(libc::EEXIST)).is_none());
    }

    #[test]
    fn preserve_existing_log_file_mode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.txt");
        fs::write(&path, b"hello").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();
        let _f = open_log_file_secure_append(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640, "existing permissions should be preserved");
    }

    #[test]
    fn new_log_file_gets_0600() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("new_log.txt");
        let _f = open_log_file_secure_append(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "newly created log file should be 0600");
    }

    #[test]
    fn config_write_sets_mode_and_refuses_overwrite() {
        let dir = tempdir().unwrap();
        let cfg = dir.path().join("config.xml");
        write_config_secure_new_0600(&cfg, b"<config/>").unwrap();
        assert_eq!(fs::read(&cfg).unwrap(), b"<config/>");
        let mode = fs::metadata(&cfg).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);

        assert!(write_config_secure_new_0600(&cfg, b"<other/>").is_err());
        assert_eq!(fs::read(&cfg).unwrap(), b"<config/>");
        for entry in fs::read_dir(dir.path()).unwrap() {
            let name = entry.unwrap().file_name().to_string_lossy().into_owned();
            assert!(!name.ends_with(".tmp"), "leftover temp file: {name}");
        }
    }
}

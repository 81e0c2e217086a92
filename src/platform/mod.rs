//! Platform-specific helpers.
//! This module hides OS differences (Unix/Windows) behind a uniform API so
//! the relocation engine can remain platform-agnostic.
//!
//! The one behavioral divergence that matters to the engine is symlink
//! creation: Windows needs to know whether the target is a directory,
//! Unix does not care.

#[cfg(unix)]
mod common_unix;
#[cfg(unix)]
mod unix;
#[cfg(not(unix))]
mod windows;

#[cfg(unix)]
pub use unix::{
    create_symlink, open_log_file_secure_append, remove_symlink, set_dir_mode_0700,
    set_file_mode_0600, symlink_privilege_hint, write_config_secure_new_0600,
};

#[cfg(not(unix))]
pub use windows::{
    create_symlink, open_log_file_secure_append, remove_symlink, set_dir_mode_0700,
    set_file_mode_0600, symlink_privilege_hint, write_config_secure_new_0600,
};

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Hidden sibling of `target` for write-then-publish: `.<name>.<pid>.<seq>.tmp`.
pub(crate) fn temp_sibling(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dirlink".into());
    let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
    let tmp = format!(".{name}.{}.{seq}.tmp", std::process::id());
    target.parent().unwrap_or_else(|| Path::new(".")).join(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_siblings_are_distinct_and_beside_the_target() {
        let target = Path::new("/cfg/config.xml");
        let a = temp_sibling(target);
        let b = temp_sibling(target);
        assert_ne!(a, b);
        assert_eq!(a.parent(), Some(Path::new("/cfg")));
        assert!(a.file_name().unwrap().to_string_lossy().starts_with(".config.xml."));
    }
}

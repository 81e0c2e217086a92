//! Filesystem operations used by the relocation engine.
//!
//! Every mutation the engine performs goes through the [`Filesystem`] trait.
//! The default methods call straight into `std::fs` and the platform shim;
//! [`OsFilesystem`] is the production implementation. Tests substitute an
//! implementation that overrides a single method to inject a failure.

mod helpers;
mod util;

pub use helpers::{describe_io, io_error_with_help, io_error_with_help_io};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::platform;

/// Blocking filesystem primitives needed by a relocation.
pub trait Filesystem {
    /// True when `path` resolves to an existing entry (follows symlinks).
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    /// Metadata of `path` itself, without following a final symlink.
    fn symlink_metadata(&self, path: &Path) -> io::Result<fs::Metadata> {
        fs::symlink_metadata(path)
    }

    /// Metadata of whatever `path` resolves to.
    fn metadata(&self, path: &Path) -> io::Result<fs::Metadata> {
        fs::metadata(path)
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        fs::read_link(path)
    }

    /// Recursive, idempotent directory creation.
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    /// Move a whole tree with a single rename. Cross-device moves fail.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)?;
        // Persist the new directory entry (best-effort).
        if let Some(parent) = to.parent() {
            let _ = util::fsync_dir(parent);
        }
        Ok(())
    }

    fn create_symlink(&self, target: &Path, link: &Path, is_dir: bool) -> io::Result<()> {
        platform::create_symlink(target, link, is_dir)
    }

    fn remove_symlink(&self, link: &Path, is_dir: bool) -> io::Result<()> {
        platform::remove_symlink(link, is_dir)
    }
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFilesystem;

impl Filesystem for OsFilesystem {}

impl<F: Filesystem + ?Sized> Filesystem for &F {
    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }
    fn symlink_metadata(&self, path: &Path) -> io::Result<fs::Metadata> {
        (**self).symlink_metadata(path)
    }
    fn metadata(&self, path: &Path) -> io::Result<fs::Metadata> {
        (**self).metadata(path)
    }
    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        (**self).read_link(path)
    }
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        (**self).create_dir_all(path)
    }
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        (**self).rename(from, to)
    }
    fn create_symlink(&self, target: &Path, link: &Path, is_dir: bool) -> io::Result<()> {
        (**self).create_symlink(target, link, is_dir)
    }
    fn remove_symlink(&self, link: &Path, is_dir: bool) -> io::Result<()> {
        (**self).remove_symlink(link, is_dir)
    }
}

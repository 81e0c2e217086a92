#![allow(dead_code)]

use std::cell::Cell;
use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use dirlink::{Confirmer, Filesystem, OsFilesystem, Prompt};
use walkdir::WalkDir;

/// What a path holds, compared byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Dir,
    File(Vec<u8>),
    Link(PathBuf),
}

/// Everything under `root`, keyed by path relative to it.
pub fn snapshot(root: &Path) -> BTreeMap<PathBuf, Node> {
    let mut out = BTreeMap::new();
    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry = entry.expect("walk tree");
        let rel = entry.path().strip_prefix(root).unwrap().to_path_buf();
        let ft = entry.file_type();
        let node = if ft.is_symlink() {
            Node::Link(fs::read_link(entry.path()).unwrap())
        } else if ft.is_dir() {
            Node::Dir
        } else {
            Node::File(fs::read(entry.path()).unwrap())
        };
        out.insert(rel, node);
    }
    out
}

/// A canonical temp dir (macOS tempdirs live behind a symlink).
pub fn workspace() -> (tempfile::TempDir, PathBuf) {
    let td = tempfile::tempdir().unwrap();
    let base = fs::canonicalize(td.path()).unwrap();
    (td, base)
}

/// `base/data/big` with a couple of files and a nested dir; `base/archive`.
pub fn seed_tree(base: &Path) -> PathBuf {
    let src = base.join("data").join("big");
    fs::create_dir_all(src.join("nested")).unwrap();
    fs::write(src.join("a.txt"), b"alpha").unwrap();
    fs::write(src.join("nested").join("b.bin"), [0u8, 1, 2, 254, 255]).unwrap();
    fs::create_dir_all(base.join("archive")).unwrap();
    src
}

pub fn is_symlink(p: &Path) -> bool {
    fs::symlink_metadata(p)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

/// Answers from a queue (empty queue means "no") and records every prompt.
#[derive(Debug, Default)]
pub struct Scripted {
    answers: VecDeque<bool>,
    pub asked: Vec<String>,
}

impl Scripted {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            asked: Vec::new(),
        }
    }
}

impl Confirmer for Scripted {
    fn confirm(&mut self, prompt: &Prompt<'_>) -> io::Result<bool> {
        self.asked.push(prompt.to_string());
        Ok(self.answers.pop_front().unwrap_or(false))
    }
}

/// Fails to read an answer at all.
pub struct Broken;

impl Confirmer for Broken {
    fn confirm(&mut self, _prompt: &Prompt<'_>) -> io::Result<bool> {
        Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"))
    }
}

/// Symlink creation is refused.
#[derive(Debug, Default)]
pub struct LinkDenied;

impl Filesystem for LinkDenied {
    fn create_symlink(&self, _target: &Path, _link: &Path, _is_dir: bool) -> io::Result<()> {
        Err(io::Error::from(io::ErrorKind::PermissionDenied))
    }
}

/// Only the first `allowed` renames succeed; optionally links fail too.
#[derive(Debug)]
pub struct RenameBudget {
    allowed: usize,
    used: Cell<usize>,
    fail_link: bool,
}

impl RenameBudget {
    pub fn new(allowed: usize, fail_link: bool) -> Self {
        Self {
            allowed,
            used: Cell::new(0),
            fail_link,
        }
    }
}

impl Filesystem for RenameBudget {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let n = self.used.get();
        self.used.set(n + 1);
        if n < self.allowed {
            OsFilesystem.rename(from, to)
        } else {
            Err(io::Error::new(io::ErrorKind::ResourceBusy, "device busy"))
        }
    }

    fn create_symlink(&self, target: &Path, link: &Path, is_dir: bool) -> io::Result<()> {
        if self.fail_link {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        OsFilesystem.create_symlink(target, link, is_dir)
    }
}

/// Symlink removal is refused.
#[derive(Debug, Default)]
pub struct UnlinkDenied;

impl Filesystem for UnlinkDenied {
    fn remove_symlink(&self, _link: &Path, _is_dir: bool) -> io::Result<()> {
        Err(io::Error::from(io::ErrorKind::PermissionDenied))
    }
}

/// Directory creation is refused.
#[derive(Debug, Default)]
pub struct MkdirDenied;

impl Filesystem for MkdirDenied {
    fn create_dir_all(&self, _path: &Path) -> io::Result<()> {
        Err(io::Error::from(io::ErrorKind::PermissionDenied))
    }
}

//! Completed relocations and undo results.

use std::path::PathBuf;

/// Proof of a completed relocation; the only input `undo` needs.
///
/// Not persisted anywhere. The caller keeps at most one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocationRecord {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Always equal to `source`.
    pub link: PathBuf,
    pub is_dir: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoStatus {
    Restored { source: PathBuf },
    NothingToUndo,
}

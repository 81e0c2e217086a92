//! Typed error definitions for dirlink.
//!
//! Each relocation or undo failure maps to exactly one [`Stage`] and reports
//! the [`FilesystemState`] it left behind, so callers (and tests) can tell
//! whether manual cleanup is needed without parsing messages.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Step of the transaction at which a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Validation,
    ParentCreation,
    Move,
    Link,
    Rollback,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Validation => "validation",
            Stage::ParentCreation => "parent-creation",
            Stage::Move => "move",
            Stage::Link => "link",
            Stage::Rollback => "rollback",
        };
        f.write_str(s)
    }
}

/// What a failed call left on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilesystemState {
    /// The tree was not moved and no link was created or removed. A
    /// destination parent created for the move may remain, empty.
    Untouched,
    /// The tree was moved, then moved back after the link failed.
    RolledBack,
    /// The tree sits at the destination and nothing is at the source.
    MovedWithoutLink,
    /// Undo removed the link but could not move the tree back.
    UnlinkedWithoutRestore,
}

impl FilesystemState {
    /// True when the user has to reconcile the two paths by hand.
    pub fn needs_manual_cleanup(self) -> bool {
        matches!(
            self,
            FilesystemState::MovedWithoutLink | FilesystemState::UnlinkedWithoutRestore
        )
    }

    /// Short statement of which mutations are in effect.
    pub fn summary(self) -> &'static str {
        match self {
            FilesystemState::Untouched => {
                "nothing was moved and no link was created or removed (an empty destination parent created for the move may remain)"
            }
            FilesystemState::RolledBack => "the move was rolled back; no link was created",
            FilesystemState::MovedWithoutLink => "the move happened, the link was not created and rollback failed",
            FilesystemState::UnlinkedWithoutRestore => "the link was removed but the tree was not moved back",
        }
    }
}

/// Precondition violations detected before anything is mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    EmptyPath,
    SourceMissing,
    NoFileName,
    DestinationExists,
    DestinationInsideSource,
    ParentNotDirectory,
    LinkMissing,
    NotASymlink,
    LinkRetargeted { actual: PathBuf },
    RelocatedTreeMissing,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationFailure::EmptyPath => f.write_str("path is empty"),
            ValidationFailure::SourceMissing => f.write_str("source missing"),
            ValidationFailure::NoFileName => f.write_str("source has no final path component"),
            ValidationFailure::DestinationExists => f.write_str("destination exists"),
            ValidationFailure::DestinationInsideSource => {
                f.write_str("destination is the source or lies inside it")
            }
            ValidationFailure::ParentNotDirectory => {
                f.write_str("destination parent is not a directory")
            }
            ValidationFailure::LinkMissing | ValidationFailure::NotASymlink => {
                f.write_str("link missing or not a symlink")
            }
            ValidationFailure::LinkRetargeted { actual } => {
                write!(f, "link now points to '{}'", actual.display())
            }
            ValidationFailure::RelocatedTreeMissing => {
                f.write_str("relocated tree no longer exists")
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum RelocationError {
    #[error("{failure}: {}", .path.display())]
    Validation {
        failure: ValidationFailure,
        path: PathBuf,
    },

    #[error("could not create destination parent: {detail}")]
    ParentCreation {
        path: PathBuf,
        detail: String,
        #[source]
        source: io::Error,
    },

    #[error("could not move '{}' to '{}': {detail}", .from.display(), .to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        detail: String,
        #[source]
        source: io::Error,
    },

    #[error(
        "could not create symlink at '{}': {detail}; the tree was moved back to '{}'",
        .link.display(),
        .link.display()
    )]
    Link {
        link: PathBuf,
        destination: PathBuf,
        detail: String,
        hint: Option<&'static str>,
        #[source]
        source: io::Error,
    },

    #[error(
        "could not create symlink ({link_detail}) and moving back failed ({detail}); move '{}' back to '{}' manually",
        .destination.display(),
        .source_path.display()
    )]
    Rollback {
        source_path: PathBuf,
        destination: PathBuf,
        link_detail: String,
        detail: String,
        #[source]
        source: io::Error,
    },

    #[error("could not remove symlink: {detail}")]
    Unlink {
        link: PathBuf,
        detail: String,
        #[source]
        source: io::Error,
    },

    #[error(
        "symlink '{}' was removed but moving the tree back failed: {detail}; move '{}' to '{}' manually",
        .link.display(),
        .destination.display(),
        .link.display()
    )]
    Restore {
        link: PathBuf,
        destination: PathBuf,
        detail: String,
        #[source]
        source: io::Error,
    },
}

impl RelocationError {
    pub(crate) fn validation(failure: ValidationFailure, path: impl Into<PathBuf>) -> Self {
        RelocationError::Validation {
            failure,
            path: path.into(),
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            RelocationError::Validation { .. } => Stage::Validation,
            RelocationError::ParentCreation { .. } => Stage::ParentCreation,
            RelocationError::Move { .. } | RelocationError::Restore { .. } => Stage::Move,
            RelocationError::Link { .. } | RelocationError::Unlink { .. } => Stage::Link,
            RelocationError::Rollback { .. } => Stage::Rollback,
        }
    }

    pub fn filesystem_state(&self) -> FilesystemState {
        match self {
            RelocationError::Validation { .. }
            | RelocationError::ParentCreation { .. }
            | RelocationError::Move { .. }
            | RelocationError::Unlink { .. } => FilesystemState::Untouched,
            RelocationError::Link { .. } => FilesystemState::RolledBack,
            RelocationError::Rollback { .. } => FilesystemState::MovedWithoutLink,
            RelocationError::Restore { .. } => FilesystemState::UnlinkedWithoutRestore,
        }
    }

    pub fn needs_manual_cleanup(&self) -> bool {
        self.filesystem_state().needs_manual_cleanup()
    }

    /// Platform advice attached to a rolled-back link failure.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            RelocationError::Link { hint, .. } => *hint,
            _ => None,
        }
    }

    pub fn validation_failure(&self) -> Option<&ValidationFailure> {
        match self {
            RelocationError::Validation { failure, .. } => Some(failure),
            _ => None,
        }
    }
}

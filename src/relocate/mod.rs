//! Relocation engine.
//!
//! Moves a tree to a new path and leaves a symlink at the old one. The two
//! mutations behave as one step from the caller's point of view:
//!
//! - validation and confirmation happen before anything is touched;
//! - if the link cannot be created, the move is rolled back;
//! - if the rollback fails too, the error names both paths so the user can
//!   reconcile them by hand.
//!
//! The engine keeps no state between calls. `relocate` hands back a
//! [`RelocationRecord`] and `undo` takes the caller's slot holding it.
//!
//! Assumes nobody else touches the two paths while a call is running; no
//! locking is done.

mod confirm;
mod plan;
mod record;
mod request;

pub use confirm::{AssumeYes, Confirmer, Prompt};
pub use plan::RelocationPlan;
pub use record::{RelocationRecord, UndoStatus};
pub use request::{Destination, RelocationRequest};

use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::errors::{RelocationError, ValidationFailure};
use crate::fs_ops::{describe_io, Filesystem, OsFilesystem};
use crate::platform::symlink_privilege_hint;
use crate::shutdown;

/// How a successful or declined call ended. Failures are `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome<T> {
    Completed(T),
    Cancelled,
}

impl<T> Outcome<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled)
    }

    pub fn completed(self) -> Option<T> {
        match self {
            Outcome::Completed(v) => Some(v),
            Outcome::Cancelled => None,
        }
    }
}

/// What to do when the destination's parent directory is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParentPolicy {
    /// Create it without asking.
    Create,
    /// Ask the confirmer first; "no" cancels the relocation.
    #[default]
    Confirm,
}

#[derive(Debug, Clone, Default)]
pub struct Relocator<F = OsFilesystem> {
    fs: F,
    parent_policy: ParentPolicy,
}

impl Relocator<OsFilesystem> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<F: Filesystem> Relocator<F> {
    pub fn with_filesystem(fs: F) -> Self {
        Self {
            fs,
            parent_policy: ParentPolicy::default(),
        }
    }

    pub fn parent_policy(mut self, policy: ParentPolicy) -> Self {
        self.parent_policy = policy;
        self
    }

    /// Validate a request without touching the filesystem.
    pub fn plan(&self, request: &RelocationRequest) -> Result<RelocationPlan, RelocationError> {
        let (source, destination) = request.resolve()?;

        if !self.fs.exists(&source) {
            debug!(src = %source.display(), "source does not exist");
            return Err(RelocationError::validation(ValidationFailure::SourceMissing, source));
        }
        // A dangling symlink at the destination still occupies the name.
        if self.fs.symlink_metadata(&destination).is_ok() {
            debug!(dest = %destination.display(), "destination already exists");
            return Err(RelocationError::validation(
                ValidationFailure::DestinationExists,
                destination,
            ));
        }

        let (ancestor, missing_parent) = self.nearest_existing_ancestor(&destination);
        let Some(ancestor) = ancestor else {
            return Err(RelocationError::validation(
                ValidationFailure::ParentNotDirectory,
                destination,
            ));
        };
        if !self.fs.metadata(&ancestor).map(|m| m.is_dir()).unwrap_or(false) {
            debug!(ancestor = %ancestor.display(), "destination ancestor is not a directory");
            return Err(RelocationError::validation(
                ValidationFailure::ParentNotDirectory,
                ancestor,
            ));
        }
        if is_inside(&source, &destination, &ancestor) {
            return Err(RelocationError::validation(
                ValidationFailure::DestinationInsideSource,
                destination,
            ));
        }

        let source_is_dir = self.fs.metadata(&source).map(|m| m.is_dir()).unwrap_or(false);
        debug!(
            src = %source.display(),
            dest = %destination.display(),
            source_is_dir,
            missing_parent = missing_parent.is_some(),
            "relocation validated"
        );
        Ok(RelocationPlan {
            source,
            destination,
            missing_parent,
            source_is_dir,
        })
    }

    /// Move `request.source` to its destination and leave a symlink behind.
    pub fn relocate<C: Confirmer + ?Sized>(
        &self,
        request: &RelocationRequest,
        confirmer: &mut C,
    ) -> Result<Outcome<RelocationRecord>, RelocationError> {
        let plan = self.plan(request)?;

        if let Some(parent) = &plan.missing_parent
            && self.parent_policy == ParentPolicy::Confirm
            && !ask(confirmer, &Prompt::CreateParent { path: parent })
        {
            info!(parent = %parent.display(), "parent creation declined");
            return Ok(Outcome::Cancelled);
        }
        if !ask(confirmer, &Prompt::Relocate { plan: &plan }) {
            info!(src = %plan.source.display(), "relocation declined");
            return Ok(Outcome::Cancelled);
        }

        let Some(_critical) = shutdown::enter_critical() else {
            info!("shutdown requested before the move; nothing changed");
            return Ok(Outcome::Cancelled);
        };
        self.execute(&plan).map(Outcome::Completed)
    }

    fn execute(&self, plan: &RelocationPlan) -> Result<RelocationRecord, RelocationError> {
        let RelocationPlan {
            source,
            destination,
            missing_parent,
            source_is_dir,
        } = plan;

        if let Some(parent) = missing_parent {
            self.fs.create_dir_all(parent).map_err(|e| {
                error!(parent = %parent.display(), error = %e, "parent creation failed");
                RelocationError::ParentCreation {
                    path: parent.clone(),
                    detail: describe_io("create directory", parent, &e),
                    source: e,
                }
            })?;
            info!(parent = %parent.display(), "created destination parent");
        }

        self.fs.rename(source, destination).map_err(|e| {
            error!(src = %source.display(), dest = %destination.display(), error = %e, "move failed");
            RelocationError::Move {
                from: source.clone(),
                to: destination.clone(),
                detail: describe_io("move", source, &e),
                source: e,
            }
        })?;
        info!(src = %source.display(), dest = %destination.display(), "moved");

        if let Err(link_err) = self.fs.create_symlink(destination, source, *source_is_dir) {
            warn!(link = %source.display(), error = %link_err, "symlink creation failed; rolling back");
            return Err(self.roll_back(source, destination, link_err));
        }
        info!(link = %source.display(), target = %destination.display(), "symlink created");

        Ok(RelocationRecord {
            source: source.clone(),
            destination: destination.clone(),
            link: source.clone(),
            is_dir: *source_is_dir,
        })
    }

    fn roll_back(&self, source: &Path, destination: &Path, link_err: std::io::Error) -> RelocationError {
        let mut link_detail = describe_io("create symlink", source, &link_err);
        let hint = symlink_privilege_hint(&link_err);
        if let Some(h) = hint {
            link_detail.push_str("; hint: ");
            link_detail.push_str(h);
        }

        match self.fs.rename(destination, source) {
            Ok(()) => {
                info!(src = %source.display(), "rollback succeeded");
                RelocationError::Link {
                    link: source.to_path_buf(),
                    destination: destination.to_path_buf(),
                    detail: link_detail,
                    hint,
                    source: link_err,
                }
            }
            Err(e) => {
                error!(
                    src = %source.display(),
                    dest = %destination.display(),
                    error = %e,
                    "rollback failed; tree left at destination"
                );
                RelocationError::Rollback {
                    source_path: source.to_path_buf(),
                    destination: destination.to_path_buf(),
                    link_detail,
                    detail: describe_io("move back", destination, &e),
                    source: e,
                }
            }
        }
    }

    /// Reverse the relocation held in `slot`. The slot is cleared only when
    /// the tree is back at its original path.
    pub fn undo<C: Confirmer + ?Sized>(
        &self,
        slot: &mut Option<RelocationRecord>,
        confirmer: &mut C,
    ) -> Result<Outcome<UndoStatus>, RelocationError> {
        let Some(record) = slot.as_ref() else {
            debug!("undo requested with no retained relocation");
            return Ok(Outcome::Completed(UndoStatus::NothingToUndo));
        };

        self.verify_link(record)?;

        if !ask(confirmer, &Prompt::Undo { record }) {
            info!(link = %record.link.display(), "undo declined");
            return Ok(Outcome::Cancelled);
        }
        let Some(_critical) = shutdown::enter_critical() else {
            info!("shutdown requested before undo; nothing changed");
            return Ok(Outcome::Cancelled);
        };

        self.fs.remove_symlink(&record.link, record.is_dir).map_err(|e| {
            error!(link = %record.link.display(), error = %e, "symlink removal failed");
            RelocationError::Unlink {
                link: record.link.clone(),
                detail: describe_io("remove symlink", &record.link, &e),
                source: e,
            }
        })?;
        info!(link = %record.link.display(), "symlink removed");

        // The link is not recreated if this fails.
        self.fs.rename(&record.destination, &record.source).map_err(|e| {
            error!(
                dest = %record.destination.display(),
                src = %record.source.display(),
                error = %e,
                "moving the tree back failed after the link was removed"
            );
            RelocationError::Restore {
                link: record.link.clone(),
                destination: record.destination.clone(),
                detail: describe_io("move back", &record.destination, &e),
                source: e,
            }
        })?;
        info!(src = %record.source.display(), "relocation undone");

        let source = record.source.clone();
        *slot = None;
        Ok(Outcome::Completed(UndoStatus::Restored { source }))
    }

    /// The link must still be ours: a symlink, pointing at the destination,
    /// which still exists. Anything else means the user changed things and
    /// deleting the path could destroy real data.
    fn verify_link(&self, record: &RelocationRecord) -> Result<(), RelocationError> {
        let link = &record.link;
        let meta = self
            .fs
            .symlink_metadata(link)
            .map_err(|_| RelocationError::validation(ValidationFailure::LinkMissing, link))?;
        if !meta.file_type().is_symlink() {
            return Err(RelocationError::validation(ValidationFailure::NotASymlink, link));
        }
        let actual = self
            .fs
            .read_link(link)
            .map_err(|_| RelocationError::validation(ValidationFailure::NotASymlink, link))?;
        if dunce::simplified(&actual) != dunce::simplified(&record.destination) {
            return Err(RelocationError::validation(
                ValidationFailure::LinkRetargeted { actual },
                link,
            ));
        }
        if self.fs.symlink_metadata(&record.destination).is_err() {
            return Err(RelocationError::validation(
                ValidationFailure::RelocatedTreeMissing,
                &record.destination,
            ));
        }
        Ok(())
    }

    /// Closest existing ancestor of `path`, plus `path`'s parent when that
    /// parent does not exist yet.
    fn nearest_existing_ancestor(&self, path: &Path) -> (Option<PathBuf>, Option<PathBuf>) {
        let parent = path.parent().map(Path::to_path_buf);
        let mut current = parent.clone();
        while let Some(dir) = current {
            if self.fs.exists(&dir) {
                let missing = parent.filter(|p| *p != dir);
                return (Some(dir), missing);
            }
            current = dir.parent().map(Path::to_path_buf);
        }
        (None, parent)
    }
}

/// Ask, treating an unreadable answer as "no".
fn ask<C: Confirmer + ?Sized>(confirmer: &mut C, prompt: &Prompt<'_>) -> bool {
    match confirmer.confirm(prompt) {
        Ok(answer) => answer,
        Err(e) => {
            warn!(error = %e, "could not read confirmation; treating it as declined");
            false
        }
    }
}

/// True when `destination` equals `source` or would land inside it, either
/// lexically or once symlinks in the existing part of the path are resolved.
fn is_inside(source: &Path, destination: &Path, existing_ancestor: &Path) -> bool {
    if destination.starts_with(source) {
        return true;
    }
    match (
        dunce::canonicalize(source),
        dunce::canonicalize(existing_ancestor),
    ) {
        (Ok(src_real), Ok(anc_real)) => anc_real.starts_with(&src_real),
        _ => false,
    }
}

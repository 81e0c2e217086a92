//! Core library for `dirlink`.
//!
//! Relocates a directory tree and leaves a symbolic link at the old path.
//! The engine lives in [`relocate`]; [`session`] and [`cli`] are the two
//! front ends that collect paths and confirmations.

pub mod cli;
pub mod config;
pub mod errors;
pub mod fs_ops;
pub mod output;
pub mod platform;
pub mod relocate;
pub mod session;
pub mod shutdown;

pub use config::{default_config_path, default_log_path, path_has_symlink_ancestor, Config, LogLevel};
pub use errors::{FilesystemState, RelocationError, Stage, ValidationFailure};
pub use fs_ops::{Filesystem, OsFilesystem};
pub use relocate::{
    AssumeYes, Confirmer, Destination, Outcome, ParentPolicy, Prompt, RelocationPlan,
    RelocationRecord, RelocationRequest, Relocator, UndoStatus,
};
pub use session::{Session, SessionSummary};

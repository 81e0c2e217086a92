//! Validated, not yet executed relocation.

use std::fmt;
use std::path::PathBuf;

/// Result of validating a request. Holding a plan means nothing has been
/// touched yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocationPlan {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Destination parent that has to be created before the move.
    pub missing_parent: Option<PathBuf>,
    pub source_is_dir: bool,
}

impl fmt::Display for RelocationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = &self.missing_parent {
            writeln!(f, "0. create directory: {}", parent.display())?;
        }
        writeln!(
            f,
            "1. move: {} -> {}",
            self.source.display(),
            self.destination.display()
        )?;
        write!(
            f,
            "2. create symlink: {} -> {}",
            self.source.display(),
            self.destination.display()
        )
    }
}

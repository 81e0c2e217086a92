//! Relocation requests and final-path derivation.

use std::path::{Component, Path, PathBuf};

use crate::errors::{RelocationError, ValidationFailure};

/// Where the relocated tree should end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// The exact path the tree will occupy.
    Explicit(PathBuf),
    /// An existing (or to-be-created) parent; the tree keeps its own name.
    IntoParent(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocationRequest {
    pub source: PathBuf,
    pub destination: Destination,
}

impl RelocationRequest {
    pub fn explicit(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: Destination::Explicit(destination.into()),
        }
    }

    pub fn into_parent(source: impl Into<PathBuf>, parent: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: Destination::IntoParent(parent.into()),
        }
    }

    /// Absolute source and final destination paths.
    pub(crate) fn resolve(&self) -> Result<(PathBuf, PathBuf), RelocationError> {
        let source = absolutize(&self.source)?;
        let destination = match &self.destination {
            Destination::Explicit(dest) => absolutize(dest)?,
            Destination::IntoParent(parent) => {
                let parent = absolutize(parent)?;
                let name = source.file_name().ok_or_else(|| {
                    RelocationError::validation(ValidationFailure::NoFileName, &source)
                })?;
                parent.join(name)
            }
        };
        Ok((source, destination))
    }
}

/// Make `path` absolute against the current directory and normalize it
/// lexically: trailing separators and `.` are dropped, and `..` removes the
/// component before it (never the root). Symlinks are not resolved; the
/// result is the exact path every later check and mutation uses.
fn absolutize(path: &Path) -> Result<PathBuf, RelocationError> {
    if path.as_os_str().is_empty() {
        return Err(RelocationError::validation(ValidationFailure::EmptyPath, path));
    }
    let abs = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut out = PathBuf::new();
    for comp in abs.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                }
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn into_parent_appends_source_name() {
        let req = RelocationRequest::into_parent("/data/big/", "/archive");
        let (src, dest) = req.resolve().unwrap();
        assert_eq!(src, PathBuf::from("/data/big"));
        assert_eq!(dest, PathBuf::from("/archive/big"));
    }

    #[cfg(unix)]
    #[test]
    fn explicit_destination_is_taken_verbatim() {
        let req = RelocationRequest::explicit("/data/big", "/archive/renamed/");
        let (_, dest) = req.resolve().unwrap();
        assert_eq!(dest, PathBuf::from("/archive/renamed"));
    }

    #[cfg(unix)]
    #[test]
    fn root_source_has_no_name_to_keep() {
        let err = RelocationRequest::into_parent("/", "/archive").resolve().unwrap_err();
        assert_eq!(err.validation_failure(), Some(&ValidationFailure::NoFileName));
    }

    #[test]
    fn relative_paths_become_absolute() {
        let req = RelocationRequest::explicit("some/dir", "./elsewhere");
        let (src, dest) = req.resolve().unwrap();
        assert!(src.is_absolute());
        assert!(dest.is_absolute());
        assert!(dest.ends_with("elsewhere"));
    }

    #[cfg(unix)]
    #[test]
    fn parent_components_are_resolved_lexically() {
        let req = RelocationRequest::explicit("/data/./big", "/archive/nope/../big");
        let (src, dest) = req.resolve().unwrap();
        assert_eq!(src, PathBuf::from("/data/big"));
        assert_eq!(dest, PathBuf::from("/archive/big"));

        let (_, dest) = RelocationRequest::explicit("/data/big", "/../../big").resolve().unwrap();
        assert_eq!(dest, PathBuf::from("/big"));
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = RelocationRequest::explicit("", "/x").resolve().unwrap_err();
        assert_eq!(err.validation_failure(), Some(&ValidationFailure::EmptyPath));
    }
}

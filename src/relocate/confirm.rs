//! Confirmation collaborator.
//!
//! The engine never moves or links anything without an affirmative answer
//! from a [`Confirmer`]. Front ends decide how to ask.

use std::fmt;
use std::io;
use std::path::Path;

use super::plan::RelocationPlan;
use super::record::RelocationRecord;

/// A pending action that needs the user's approval.
#[derive(Debug, Clone, Copy)]
pub enum Prompt<'a> {
    CreateParent { path: &'a Path },
    Relocate { plan: &'a RelocationPlan },
    Undo { record: &'a RelocationRecord },
}

impl fmt::Display for Prompt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prompt::CreateParent { path } => {
                write!(f, "Destination parent '{}' does not exist. Create it?", path.display())
            }
            Prompt::Relocate { plan } => {
                writeln!(f, "About to perform:")?;
                writeln!(f, "{plan}")?;
                write!(f, "Proceed?")
            }
            Prompt::Undo { record } => {
                writeln!(f, "About to undo:")?;
                writeln!(f, "1. remove symlink: {}", record.link.display())?;
                writeln!(
                    f,
                    "2. move: {} -> {}",
                    record.destination.display(),
                    record.source.display()
                )?;
                write!(f, "Proceed?")
            }
        }
    }
}

pub trait Confirmer {
    /// `Ok(true)` only for an explicit yes. Errors count as "no".
    fn confirm(&mut self, prompt: &Prompt<'_>) -> io::Result<bool>;
}

impl<C: Confirmer + ?Sized> Confirmer for &mut C {
    fn confirm(&mut self, prompt: &Prompt<'_>) -> io::Result<bool> {
        (**self).confirm(prompt)
    }
}

/// Answers yes to everything (`--yes`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirmer for AssumeYes {
    fn confirm(&mut self, _prompt: &Prompt<'_>) -> io::Result<bool> {
        Ok(true)
    }
}

//! Interactive line-prompt front end.
//!
//! Reads a source and a destination per round, asks `yes/no` before any
//! change, and keeps the last completed relocation so `undo` can revert it.
//! Input and output are plain `BufRead`/`Write` so the whole dialogue can be
//! scripted.

use std::io::{self, BufRead, Write};

use crate::cli::sanitize_str;
use crate::errors::RelocationError;
use crate::fs_ops::{Filesystem, OsFilesystem};
use crate::output::failure_report;
use crate::relocate::{
    Confirmer, Outcome, Prompt, RelocationRecord, RelocationRequest, Relocator, UndoStatus,
};
use crate::shutdown;

pub const HELP_TEXT: &str = "\
Usage:
  dirlink moves a directory to a new location and puts a symbolic link at
  the old location, so anything that refers to the old path keeps working.

Steps:
  1. Enter the directory to relocate (the source).
  2. Enter the full new path for it (the destination). It must not exist yet.
  3. Review the two pending actions and answer 'yes' to go ahead.

Commands at the source prompt:
  help   show this text
  undo   remove the link and move the last relocated directory back
  quit   leave the session

Notes:
  - On Windows, creating symbolic links needs an elevated prompt or
    Developer Mode.
  - Prefer absolute paths; relative ones are resolved against the current
    directory.
  - If the link cannot be created the move is rolled back automatically.
  - Only the most recent relocation of this session can be undone.";

const SOURCE_PROMPT: &str = "Source directory (help, undo, quit): ";
const DESTINATION_PROMPT: &str = "Destination path (help): ";

/// Counters reported when the session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub relocated: usize,
    pub undone: usize,
    pub failed: usize,
    /// Some failure left the filesystem needing manual cleanup.
    pub needs_cleanup: bool,
}

pub struct Session<R, W, F = OsFilesystem> {
    input: R,
    output: W,
    relocator: Relocator<F>,
    last: Option<RelocationRecord>,
    summary: SessionSummary,
}

impl<R: BufRead, W: Write, F: Filesystem> Session<R, W, F> {
    pub fn new(input: R, output: W, relocator: Relocator<F>) -> Self {
        Self {
            input,
            output,
            relocator,
            last: None,
            summary: SessionSummary::default(),
        }
    }

    /// The relocation `undo` would revert.
    pub fn last_relocation(&self) -> Option<&RelocationRecord> {
        self.last.as_ref()
    }

    /// Run until `quit`, end of input, or a shutdown request.
    pub fn run(&mut self) -> io::Result<SessionSummary> {
        writeln!(self.output, "=== dirlink: relocate a directory and leave a symlink ===")?;
        loop {
            if shutdown::is_requested() {
                break;
            }
            let Some(source) = self.read_field(SOURCE_PROMPT)? else {
                break;
            };
            match source.to_ascii_lowercase().as_str() {
                "" => continue,
                "quit" | "exit" => break,
                "undo" => {
                    self.undo()?;
                    continue;
                }
                _ => {}
            }
            let Some(destination) = self.read_field(DESTINATION_PROMPT)? else {
                break;
            };
            if destination.is_empty() {
                writeln!(self.output, "A destination is required.")?;
                continue;
            }
            let request =
                RelocationRequest::explicit(sanitize_str(&source), sanitize_str(&destination));
            self.relocate(&request)?;
        }
        self.output.flush()?;
        Ok(self.summary)
    }

    fn relocate(&mut self, request: &RelocationRequest) -> io::Result<()> {
        let mut confirmer = LineConfirmer {
            input: &mut self.input,
            output: &mut self.output,
        };
        match self.relocator.relocate(request, &mut confirmer) {
            Ok(Outcome::Completed(record)) => {
                writeln!(
                    self.output,
                    "Done: '{}' now lives at '{}' and '{}' is a symlink to it.",
                    record.source.display(),
                    record.destination.display(),
                    record.link.display()
                )?;
                writeln!(self.output, "Type 'undo' at the source prompt to revert it.")?;
                self.summary.relocated += 1;
                self.last = Some(record);
            }
            Ok(Outcome::Cancelled) => {
                writeln!(self.output, "Cancelled; nothing was changed.")?;
            }
            Err(e) => self.report_failure(&e)?,
        }
        Ok(())
    }

    fn undo(&mut self) -> io::Result<()> {
        let mut confirmer = LineConfirmer {
            input: &mut self.input,
            output: &mut self.output,
        };
        match self.relocator.undo(&mut self.last, &mut confirmer) {
            Ok(Outcome::Completed(UndoStatus::Restored { source })) => {
                writeln!(self.output, "Undone: '{}' is back in place.", source.display())?;
                self.summary.undone += 1;
            }
            Ok(Outcome::Completed(UndoStatus::NothingToUndo)) => {
                writeln!(self.output, "Nothing to undo.")?;
            }
            Ok(Outcome::Cancelled) => {
                writeln!(self.output, "Undo cancelled; nothing was changed.")?;
            }
            Err(e) => self.report_failure(&e)?,
        }
        Ok(())
    }

    fn report_failure(&mut self, err: &RelocationError) -> io::Result<()> {
        self.summary.failed += 1;
        self.summary.needs_cleanup |= err.needs_manual_cleanup();
        writeln!(self.output, "{}", failure_report(err))
    }

    /// Prompt until a non-`help` answer arrives. `None` at end of input.
    fn read_field(&mut self, prompt: &str) -> io::Result<Option<String>> {
        loop {
            write!(self.output, "{prompt}")?;
            self.output.flush()?;
            let Some(line) = read_line(&mut self.input)? else {
                return Ok(None);
            };
            if line.eq_ignore_ascii_case("help") {
                writeln!(self.output, "{HELP_TEXT}")?;
                continue;
            }
            return Ok(Some(line));
        }
    }
}

/// Trimmed next line, or `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut buf = String::new();
    if input.read_line(&mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(buf.trim().to_string()))
}

/// Asks on the session's own streams; only `yes`/`y` counts as consent.
struct LineConfirmer<'a, R, W> {
    input: &'a mut R,
    output: &'a mut W,
}

impl<R: BufRead, W: Write> Confirmer for LineConfirmer<'_, R, W> {
    fn confirm(&mut self, prompt: &Prompt<'_>) -> io::Result<bool> {
        write!(self.output, "{prompt} (yes/no): ")?;
        self.output.flush()?;
        let answer = read_line(&mut *self.input)?.unwrap_or_default();
        Ok(matches!(answer.to_ascii_lowercase().as_str(), "yes" | "y"))
    }
}

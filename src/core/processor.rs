//! The file processor.
//!
//! One path in, one [`FileReport`] out. A file is either a whole-file
//! envelope (file mode), a YAML stream that may hold inline envelopes
//! (document mode), or not a target at all (skipped). Nothing is written
//! unless at least one value was rekeyed and none failed.

use std::collections::HashMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::core::document::{Document, Location};
use crate::core::envelope;
use crate::core::fs::{self, BackupPolicy};
use crate::core::rekey::{Rekeyed, Rekeyer, SkipReason};
use crate::error::{FileError, Result};

/// Interactive confirmation, injected so the core never touches a terminal.
pub trait Confirm: Sync {
    /// Ask a yes/no question.
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// File-level options.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Back up the original bytes before replacing a file.
    pub backup: Option<BackupPolicy>,
    /// Ask before each replacement.
    pub interactive: bool,
}

/// Result of processing one path.
#[derive(Debug)]
pub enum FileOutcome {
    /// Written back with `count` rekeyed values.
    Rekeyed {
        count: usize,
        backup: Option<PathBuf>,
    },
    /// Nothing to do: no envelopes, or every envelope was skipped.
    Unchanged,
    /// Not a target (neither an envelope nor a document).
    Skipped { reason: String },
    /// Left untouched on disk because of an error.
    Failed(FileError),
}

impl FileOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Number of values rekeyed and written.
    pub fn rekeyed(&self) -> usize {
        match self {
            Self::Rekeyed { count, .. } => *count,
            _ => 0,
        }
    }

    /// Short lowercase name of the outcome.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Rekeyed { .. } => "rekeyed",
            Self::Unchanged => "unchanged",
            Self::Skipped { .. } => "skipped",
            Self::Failed(_) => "failed",
        }
    }
}

/// A per-value event worth telling the operator about.
#[derive(Debug, Clone)]
pub struct Note {
    /// Position inside the document; `None` in file mode.
    pub location: Option<Location>,
    pub kind: NoteKind,
}

#[derive(Debug, Clone)]
pub enum NoteKind {
    Skipped(SkipReason),
    /// Further failures after the one recorded in the outcome.
    Failed(String),
}

impl Note {
    /// Whether the operator has to act on this value: it was left under the
    /// old key because it could not be decrypted, or it failed outright.
    pub fn needs_attention(&self) -> bool {
        matches!(
            self.kind,
            NoteKind::Skipped(SkipReason::Undecryptable { .. }) | NoteKind::Failed(_)
        )
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(location) = &self.location {
            write!(f, "{}: ", location)?;
        }
        match &self.kind {
            NoteKind::Skipped(reason) => write!(f, "skipped, {}", reason),
            NoteKind::Failed(error) => write!(f, "failed, {}", error),
        }
    }
}

/// Everything known about one processed path.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
    pub notes: Vec<Note>,
}

impl FileReport {
    pub fn new(path: impl Into<PathBuf>, outcome: FileOutcome) -> Self {
        Self {
            path: path.into(),
            outcome,
            notes: Vec::new(),
        }
    }
}

/// Applies a [`Rekeyer`] to whole files.
pub struct FileProcessor<'a> {
    rekeyer: Rekeyer<'a>,
    options: &'a ProcessOptions,
    confirm: Option<&'a dyn Confirm>,
}

impl<'a> FileProcessor<'a> {
    pub fn new(
        rekeyer: Rekeyer<'a>,
        options: &'a ProcessOptions,
        confirm: Option<&'a dyn Confirm>,
    ) -> Self {
        Self {
            rekeyer,
            options,
            confirm,
        }
    }

    /// Read, classify, rekey and (when something changed) write one file.
    pub fn process(&self, path: &Path) -> FileReport {
        let mut notes = Vec::new();
        let outcome = match self.run(path, &mut notes) {
            Ok(outcome) => outcome,
            Err(error) => FileOutcome::Failed(error),
        };
        debug!(path = %path.display(), outcome = outcome.label(), "processed");
        FileReport {
            path: path.to_path_buf(),
            outcome,
            notes,
        }
    }

    fn run(&self, path: &Path, notes: &mut Vec<Note>) -> std::result::Result<FileOutcome, FileError> {
        // writes go to the real file so symlinks stay symlinks
        let target = std::fs::canonicalize(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => FileError::NotFound,
            _ => FileError::Read(e),
        })?;
        let original = std::fs::read(&target).map_err(FileError::Read)?;

        if let Some(info) = envelope::detect(&original) {
            debug!(path = %path.display(), envelope = %info, "vault file");
            return self.file_mode(path, &target, &original, notes);
        }

        match Document::parse(&original) {
            Ok(document) => self.document_mode(path, &target, &original, document, notes),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "not a document, skipping");
                Ok(FileOutcome::Skipped {
                    reason: e.to_string(),
                })
            }
        }
    }

    fn file_mode(
        &self,
        path: &Path,
        target: &Path,
        original: &[u8],
        notes: &mut Vec<Note>,
    ) -> std::result::Result<FileOutcome, FileError> {
        let result = self
            .rekeyer
            .rekey_bytes(original)
            .map_err(|source| FileError::Rekey {
                location: None,
                source,
            })?;
        let result = self.confirmed(result, || format!("Rekey {}?", path.display()))?;

        match result {
            Rekeyed::Done(rekeyed) => {
                let backup = self.write(target, original, rekeyed.as_bytes())?;
                info!(path = %path.display(), "rekeyed vault file");
                Ok(FileOutcome::Rekeyed { count: 1, backup })
            }
            Rekeyed::Skipped(reason) => {
                let note = Note {
                    location: None,
                    kind: NoteKind::Skipped(reason),
                };
                log_skip(path, &note);
                notes.push(note);
                Ok(FileOutcome::Unchanged)
            }
        }
    }

    fn document_mode(
        &self,
        path: &Path,
        target: &Path,
        original: &[u8],
        mut document: Document,
        notes: &mut Vec<Note>,
    ) -> std::result::Result<FileOutcome, FileError> {
        let worklist: Vec<(Location, String)> = document
            .walk()
            .filter_map(|(location, scalar)| {
                scalar
                    .as_str()
                    .filter(|value| envelope::is_envelope(value.as_bytes()))
                    .map(|value| (location, value.to_string()))
            })
            .collect();

        if worklist.is_empty() {
            debug!(path = %path.display(), "no inline envelopes");
            return Ok(FileOutcome::Unchanged);
        }
        debug!(path = %path.display(), envelopes = worklist.len(), "inline envelopes found");

        // identical envelopes (aliases, copies) get one decision and one replacement
        let mut decisions: HashMap<String, Rekeyed> = HashMap::new();
        let mut failure: Option<FileError> = None;
        let mut count = 0;

        for (location, old) in worklist {
            let decision = match decisions.get(&old) {
                Some(decision) => decision.clone(),
                None => match self.rekeyer.rekey(&old) {
                    Ok(result) => {
                        let decision = self.confirmed(result, || {
                            format!("Rekey {} at {}?", path.display(), location)
                        })?;
                        decisions.insert(old.clone(), decision.clone());
                        decision
                    }
                    Err(source) => {
                        let internal = source.is_internal();
                        if failure.is_none() {
                            failure = Some(FileError::Rekey {
                                location: Some(location.to_string()),
                                source,
                            });
                        } else {
                            notes.push(Note {
                                location: Some(location),
                                kind: NoteKind::Failed(source.to_string()),
                            });
                        }
                        if internal {
                            break;
                        }
                        continue;
                    }
                },
            };

            match decision {
                Rekeyed::Done(rekeyed) => {
                    document
                        .set(&location, rekeyed)
                        .map_err(FileError::Render)?;
                    info!(path = %path.display(), location = %location, "rekeyed value");
                    count += 1;
                }
                Rekeyed::Skipped(reason) => {
                    let note = Note {
                        location: Some(location),
                        kind: NoteKind::Skipped(reason),
                    };
                    log_skip(path, &note);
                    notes.push(note);
                }
            }
        }

        if let Some(error) = failure {
            return Err(error);
        }
        if count == 0 {
            return Ok(FileOutcome::Unchanged);
        }

        let rendered = document.render().map_err(FileError::Render)?;
        let backup = self.write(target, original, rendered.as_bytes())?;
        Ok(FileOutcome::Rekeyed { count, backup })
    }

    /// Turn a declined prompt into a skip.
    fn confirmed(
        &self,
        result: Rekeyed,
        prompt: impl FnOnce() -> String,
    ) -> std::result::Result<Rekeyed, FileError> {
        if !self.options.interactive || !matches!(result, Rekeyed::Done(_)) {
            return Ok(result);
        }
        let Some(confirm) = self.confirm else {
            return Ok(result);
        };
        let accepted = confirm
            .confirm(&prompt())
            .map_err(|e| FileError::Prompt(e.to_string()))?;
        Ok(if accepted {
            result
        } else {
            Rekeyed::Skipped(SkipReason::Declined)
        })
    }

    fn write(
        &self,
        target: &Path,
        original: &[u8],
        contents: &[u8],
    ) -> std::result::Result<Option<PathBuf>, FileError> {
        let backup = match &self.options.backup {
            Some(policy) => {
                Some(fs::write_backup(target, original, policy).map_err(FileError::Backup)?)
            }
            None => None,
        };
        fs::write_atomic(target, contents, None).map_err(FileError::Write)?;
        Ok(backup)
    }
}

fn log_skip(path: &Path, note: &Note) {
    let location = note
        .location
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default();
    match &note.kind {
        NoteKind::Skipped(SkipReason::Undecryptable { error }) => warn!(
            path = %path.display(),
            location = %location,
            error = %error,
            "ignoring undecryptable value"
        ),
        NoteKind::Skipped(reason) => debug!(
            path = %path.display(),
            location = %location,
            reason = %reason,
            "value skipped"
        ),
        NoteKind::Failed(_) => {}
    }
}

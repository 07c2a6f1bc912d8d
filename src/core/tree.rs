//! The tree orchestrator.
//!
//! Expands root paths into regular files, runs the file processor over each
//! and folds the per-file reports into a single [`Summary`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::core::constants::SKIPPED_DIRS;
use crate::core::fs::BackupPolicy;
use crate::core::processor::{FileOutcome, FileProcessor, FileReport};
use crate::error::FileError;

/// How root paths are expanded.
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Descend through symlinked directories and process symlinked files.
    pub follow_symlinks: bool,
    /// Directory names never descended into, on top of VCS metadata dirs.
    pub skip_dirs: Vec<String>,
    /// Backups written by this run; files that look like one are reported
    /// as skipped instead of being rekeyed.
    pub backups: Option<BackupPolicy>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            follow_symlinks: true,
            skip_dirs: Vec::new(),
            backups: None,
        }
    }
}

/// How the per-file loop runs.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub walk: WalkOptions,
    /// Worker threads; 1 processes files sequentially.
    pub jobs: usize,
    /// Stop starting new files after the first failure.
    pub fail_fast: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            walk: WalkOptions::default(),
            jobs: 1,
            fail_fast: false,
        }
    }
}

/// Aggregated result of a run.
#[derive(Debug, Default)]
pub struct Summary {
    /// One report per file, in enumeration order.
    pub reports: Vec<FileReport>,
    /// Files never started because the run was aborted.
    pub abandoned: usize,
}

impl Summary {
    /// True when no file failed and nothing was abandoned.
    pub fn is_success(&self) -> bool {
        self.failed() == 0 && self.abandoned == 0
    }

    pub fn rekeyed(&self) -> usize {
        self.count("rekeyed")
    }

    pub fn unchanged(&self) -> usize {
        self.count("unchanged")
    }

    pub fn skipped(&self) -> usize {
        self.count("skipped")
    }

    pub fn failed(&self) -> usize {
        self.count("failed")
    }

    /// Total values rekeyed across all files.
    pub fn values_rekeyed(&self) -> usize {
        self.reports.iter().map(|r| r.outcome.rekeyed()).sum()
    }

    fn count(&self, label: &str) -> usize {
        self.reports
            .iter()
            .filter(|r| r.outcome.label() == label)
            .count()
    }
}

/// Expand `roots` into the list of regular files to process.
///
/// Each real file appears once even when reachable through several roots or
/// symlinks; symlink loops are reported and skipped. Missing roots and
/// unreadable directories come back as failed reports, backup files as
/// skipped ones.
pub fn discover(roots: &[PathBuf], options: &WalkOptions) -> (Vec<PathBuf>, Vec<FileReport>) {
    let mut files = Vec::new();
    let mut reports = Vec::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();

    for root in roots {
        if std::fs::symlink_metadata(root).is_err() {
            warn!(path = %root.display(), "path does not exist");
            reports.push(FileReport::new(
                root.clone(),
                FileOutcome::Failed(FileError::NotFound),
            ));
            continue;
        }

        let walker = WalkDir::new(root)
            .follow_links(options.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_skipped_dir(entry, options));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    if let Some(ancestor) = e.loop_ancestor() {
                        warn!(
                            path = %e.path().unwrap_or(root).display(),
                            ancestor = %ancestor.display(),
                            "symlink loop, skipping"
                        );
                    } else {
                        let path = e.path().unwrap_or(root).to_path_buf();
                        reports.push(FileReport::new(
                            path,
                            FileOutcome::Failed(FileError::Walk(e.to_string())),
                        ));
                    }
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let real = std::fs::canonicalize(entry.path())
                .unwrap_or_else(|_| entry.path().to_path_buf());
            if !seen.insert(real) {
                debug!(path = %entry.path().display(), "already visited");
                continue;
            }

            let is_backup = options
                .backups
                .as_ref()
                .is_some_and(|policy| policy.is_backup(entry.path()));
            if entry.depth() > 0 && is_backup {
                debug!(path = %entry.path().display(), "skipping backup file");
                reports.push(FileReport::new(
                    entry.into_path(),
                    FileOutcome::Skipped {
                        reason: "backup file".to_string(),
                    },
                ));
            } else {
                files.push(entry.into_path());
            }
        }
    }

    (files, reports)
}

fn is_skipped_dir(entry: &DirEntry, options: &WalkOptions) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    SKIPPED_DIRS.contains(&name.as_ref()) || options.skip_dirs.iter().any(|d| *d == name)
}

/// Rekey everything under `roots`.
///
/// Per-file failures never stop the traversal unless `fail_fast` is set or
/// the failure signals an internal error; then files not yet started are
/// abandoned while finished ones stay written.
pub fn run(roots: &[PathBuf], processor: &FileProcessor<'_>, options: &RunOptions) -> Summary {
    let (files, mut reports) = discover(roots, &options.walk);
    info!(files = files.len(), "discovered files");

    let abort = AtomicBool::new(false);
    let process_one = |path: &PathBuf| -> Option<FileReport> {
        if abort.load(Ordering::SeqCst) {
            return None;
        }
        let report = processor.process(path);
        if let FileOutcome::Failed(error) = &report.outcome {
            if options.fail_fast || error.is_internal() {
                warn!(path = %path.display(), "aborting run after failure");
                abort.store(true, Ordering::SeqCst);
            }
        }
        Some(report)
    };

    let processed: Vec<Option<FileReport>> = if options.jobs > 1 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(options.jobs)
            .build()
        {
            Ok(pool) => pool.install(|| files.par_iter().map(&process_one).collect()),
            Err(e) => {
                warn!(error = %e, "failed to start worker pool, processing sequentially");
                files.iter().map(&process_one).collect()
            }
        }
    } else {
        files.iter().map(&process_one).collect()
    };

    let abandoned = processed.iter().filter(|r| r.is_none()).count();
    reports.extend(processed.into_iter().flatten());

    Summary { reports, abandoned }
}

/// Relative display path for reports, falling back to the path itself.
pub fn display_path(path: &Path) -> String {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf))
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}

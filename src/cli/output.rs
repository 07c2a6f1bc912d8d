//! Shared CLI output helpers and the run report.
//!
//! Color scheme (respects NO_COLOR):
//! - Green: success, checkmarks
//! - Red: errors
//! - Yellow: warnings, skips
//! - Cyan: paths, hints
//! - Bold: headers, important values
//! - Dimmed: secondary info

use colored::Colorize;
use serde::Serialize;
use std::fmt::Display;

use crate::core::processor::{FileOutcome, FileReport, NoteKind};
use crate::core::rekey::SkipReason;
use crate::core::tree::{display_path, Summary};
use crate::error::Result;

const RULE_WIDTH: usize = 56;

/// Check if color output is disabled via NO_COLOR env var.
fn colors_enabled() -> bool {
    std::env::var("NO_COLOR").is_err()
}

/// Print a success message with checkmark (green).
///
/// Example: `✓ rekeyed group_vars/all.yml`
pub fn success(msg: &str) {
    if colors_enabled() {
        println!("{} {}", "✓".green(), msg);
    } else {
        println!("✓ {}", msg);
    }
}

/// Print an error message to stderr (red).
///
/// Example: `✗ file not found`
pub fn error(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", "✗".red(), msg);
    } else {
        eprintln!("✗ {}", msg);
    }
}

/// Print a warning message (yellow).
///
/// Example: `⚠ skipped image.png`
pub fn warn(msg: &str) {
    if colors_enabled() {
        println!("{} {}", "⚠".yellow(), msg);
    } else {
        println!("⚠ {}", msg);
    }
}

/// Print a hint message (cyan).
///
/// Example: `→ pass --old-pass-file`
pub fn hint(msg: &str) {
    if colors_enabled() {
        println!("{} {}", "→".cyan(), msg.cyan());
    } else {
        println!("→ {}", msg);
    }
}

/// Print a bold section header.
pub fn header(title: &str) {
    if colors_enabled() {
        println!("{}", title.bold());
    } else {
        println!("{}", title);
    }
}

/// Print a key-value pair (label dimmed, value bold).
///
/// Example: `  rekeyed:  3`
pub fn kv(label: &str, value: impl Display) {
    if colors_enabled() {
        println!("  {}  {}", label.dimmed(), value.to_string().bold());
    } else {
        println!("  {}  {}", label, value);
    }
}

/// Print a horizontal rule separator.
pub fn rule() {
    if colors_enabled() {
        println!("{}", "─".repeat(RULE_WIDTH).dimmed());
    } else {
        println!("{}", "─".repeat(RULE_WIDTH));
    }
}

/// Format a path string in cyan.
pub fn path(p: &str) -> String {
    if colors_enabled() {
        p.cyan().to_string()
    } else {
        p.to_string()
    }
}

/// Print a dimmed/secondary message.
pub fn dimmed(msg: &str) {
    if colors_enabled() {
        println!("{}", msg.dimmed());
    } else {
        println!("{}", msg);
    }
}

/// Print a section header with a separator line.
pub fn section(title: &str) {
    println!();
    header(title);
    rule();
}

/// Print the human-readable report for a finished run.
///
/// Unchanged files only appear with `verbose`, except for values left
/// under the old key or failed, which are always listed with their path.
pub fn report(summary: &Summary, verbose: bool) {
    for file in &summary.reports {
        file_line(file, verbose);
    }

    section("Summary");
    kv("rekeyed:  ", summary.rekeyed());
    kv("unchanged:", summary.unchanged());
    kv("skipped:  ", summary.skipped());
    kv("failed:   ", summary.failed());
    kv("values:   ", summary.values_rekeyed());
    if summary.abandoned > 0 {
        warn(&format!(
            "run aborted, {} file{} not processed",
            summary.abandoned,
            plural(summary.abandoned)
        ));
    }
}

fn file_line(file: &FileReport, verbose: bool) {
    let shown = path(&display_path(&file.path));
    match &file.outcome {
        FileOutcome::Rekeyed { count, backup } => {
            success(&format!(
                "rekeyed {} ({} value{})",
                shown,
                count,
                plural(*count)
            ));
            if let Some(backup) = backup {
                dimmed(&format!("    backup: {}", display_path(backup)));
            }
        }
        FileOutcome::Unchanged if verbose => dimmed(&format!("  unchanged {}", shown)),
        FileOutcome::Unchanged => {}
        FileOutcome::Skipped { reason } => warn(&format!("skipped {}: {}", shown, reason)),
        FileOutcome::Failed(e) => error(&format!("failed {}: {}", shown, e)),
    }

    let quiet = matches!(file.outcome, FileOutcome::Unchanged) && !verbose;
    for note in &file.notes {
        if note.needs_attention() {
            warn(&format!("{}: {}", shown, note));
        } else if !quiet {
            dimmed(&format!("    {}", note));
        }
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Machine-readable view of a run.
#[derive(Serialize)]
pub struct JsonSummary<'a> {
    pub rekeyed: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
    pub abandoned: usize,
    pub values: usize,
    pub files: Vec<JsonFile<'a>>,
}

#[derive(Serialize)]
pub struct JsonFile<'a> {
    pub path: String,
    pub outcome: &'static str,
    pub values: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<JsonNote<'a>>,
}

#[derive(Serialize)]
pub struct JsonNote<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<&'a SkipReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
}

impl<'a> JsonSummary<'a> {
    pub fn new(summary: &'a Summary) -> Self {
        Self {
            rekeyed: summary.rekeyed(),
            unchanged: summary.unchanged(),
            skipped: summary.skipped(),
            failed: summary.failed(),
            abandoned: summary.abandoned,
            values: summary.values_rekeyed(),
            files: summary.reports.iter().map(JsonFile::new).collect(),
        }
    }
}

impl<'a> JsonFile<'a> {
    fn new(file: &'a FileReport) -> Self {
        let (backup, reason, error) = match &file.outcome {
            FileOutcome::Rekeyed { backup, .. } => {
                (backup.as_ref().map(|b| b.display().to_string()), None, None)
            }
            FileOutcome::Skipped { reason } => (None, Some(reason.as_str()), None),
            FileOutcome::Failed(e) => (None, None, Some(e.to_string())),
            FileOutcome::Unchanged => (None, None, None),
        };

        let notes = file
            .notes
            .iter()
            .map(|note| {
                let (skipped, error) = match &note.kind {
                    NoteKind::Skipped(reason) => (Some(reason), None),
                    NoteKind::Failed(e) => (None, Some(e.as_str())),
                };
                JsonNote {
                    location: note.location.as_ref().map(ToString::to_string),
                    skipped,
                    error,
                }
            })
            .collect();

        Self {
            path: file.path.display().to_string(),
            outcome: file.outcome.label(),
            values: file.outcome.rekeyed(),
            backup,
            reason,
            error,
            notes,
        }
    }
}

/// Print the run as pretty JSON on stdout.
pub fn report_json(summary: &Summary) -> Result<()> {
    let json = serde_json::to_string_pretty(&JsonSummary::new(summary))?;
    println!("{}", json);
    Ok(())
}

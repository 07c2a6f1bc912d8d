//! Filesystem writes: atomic replacement and backup copies.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::core::constants::{BACKUP_SUFFIX, BACKUP_TIMESTAMP};

/// What to do when a backup from an earlier run is already present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackupCollision {
    /// Replace the earlier backup.
    #[default]
    Overwrite,
    /// Keep earlier backups and add a timestamped one.
    Timestamped,
}

/// How backups are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupPolicy {
    pub suffix: String,
    pub collision: BackupCollision,
}

impl Default for BackupPolicy {
    fn default() -> Self {
        Self {
            suffix: BACKUP_SUFFIX.to_string(),
            collision: BackupCollision::default(),
        }
    }
}

impl BackupPolicy {
    /// Where the backup of `target` goes under this policy.
    pub fn backup_path(&self, target: &Path) -> PathBuf {
        let base = append_to_name(target, &self.suffix);
        match self.collision {
            BackupCollision::Overwrite => base,
            BackupCollision::Timestamped if !base.exists() => base,
            BackupCollision::Timestamped => {
                let stamp = chrono::Local::now().format(BACKUP_TIMESTAMP).to_string();
                let mut candidate = append_to_name(&base, &format!(".{}", stamp));
                let mut n = 1;
                while candidate.exists() {
                    candidate = append_to_name(&base, &format!(".{}-{}", stamp, n));
                    n += 1;
                }
                candidate
            }
        }
    }

    /// Whether `path` looks like a backup written under this policy.
    pub fn is_backup(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
            return false;
        };
        if self.suffix.is_empty() {
            return false;
        }
        if name.ends_with(&self.suffix) {
            return true;
        }
        match name.rsplit_once(self.suffix.as_str()) {
            Some((_, rest)) => rest.strip_prefix('.').is_some_and(|stamp| {
                !stamp.is_empty()
                    && stamp
                        .chars()
                        .all(|c| c.is_ascii_digit() || c == '_' || c == '-')
            }),
            None => false,
        }
    }
}

/// Write `original` as a backup of `target`, returning the backup path.
pub fn write_backup(target: &Path, original: &[u8], policy: &BackupPolicy) -> io::Result<PathBuf> {
    let path = policy.backup_path(target);
    let permissions = fs::metadata(target).ok().map(|m| m.permissions());
    write_atomic(&path, original, permissions)?;
    debug!(backup = %path.display(), "backup written");
    Ok(path)
}

/// Replace `target` with `contents` without ever exposing a partial file.
///
/// Writes a temporary file in the same directory, flushes it, then renames
/// it over the target. Permissions default to those of the existing target.
pub fn write_atomic(
    target: &Path,
    contents: &[u8],
    permissions: Option<fs::Permissions>,
) -> io::Result<()> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = permissions.or_else(|| fs::metadata(target).ok().map(|m| m.permissions()));

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    if let Some(permissions) = permissions {
        fs::set_permissions(tmp.path(), permissions)?;
    }
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

fn append_to_name(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

//! Test support utilities for vault2vault integration tests.
//!
//! Provides reusable test environment setup and helper commands.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// Test environment with isolated temp directories.
///
/// Each test gets its own temporary project dir and home dir. Password
/// files live in the home dir so they never show up in a walk of the
/// project. Child processes use `.current_dir()` so tests can run in
/// parallel.
pub struct Test {
    /// Temporary directory for the project being rekeyed
    pub dir: TempDir,
    /// Temporary home directory
    pub home: TempDir,
}

impl Test {
    /// Create a new environment with `old`/`new` password files.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let home = TempDir::new().expect("failed to create temp home");

        fs::write(home.path().join("old.pass"), format!("{}\n", OLD_PASSWORD))
            .expect("failed to write old password file");
        fs::write(home.path().join("new.pass"), format!("{}\n", NEW_PASSWORD))
            .expect("failed to write new password file");

        Self { dir, home }
    }

    /// Absolute path of a project file.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write a project file, creating parent directories.
    pub fn write(&self, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        fs::write(&path, contents).expect("failed to write file");
        path
    }

    /// Read a project file as text.
    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path(name)).expect("failed to read file")
    }

    /// Read a project file as raw bytes.
    pub fn read_bytes(&self, name: &str) -> Vec<u8> {
        fs::read(self.path(name)).expect("failed to read file")
    }

    pub fn old_pass(&self) -> PathBuf {
        self.home.path().join("old.pass")
    }

    pub fn new_pass(&self) -> PathBuf {
        self.home.path().join("new.pass")
    }
}

//! Password sources for the command line.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use dialoguer::Password;
use tracing::debug;

use crate::core::keys::{non_empty, trim_password, KeySource, VaultKey};
use crate::error::{KeyError, Result};

/// Reads a password file.
pub struct FileKeySource {
    path: PathBuf,
}

impl FileKeySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl KeySource for FileKeySource {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    fn obtain(&self) -> Result<VaultKey> {
        debug!(path = %self.path.display(), "reading password file");
        let raw = std::fs::read(&self.path).map_err(|source| KeyError::ReadFile {
            path: self.path.clone(),
            source,
        })?;
        non_empty(trim_password(&raw), self.describe())
    }
}

/// Reads a password from an environment variable.
pub struct EnvKeySource {
    var: String,
}

impl EnvKeySource {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl KeySource for EnvKeySource {
    fn describe(&self) -> String {
        format!("environment variable {}", self.var)
    }

    fn obtain(&self) -> Result<VaultKey> {
        let value = std::env::var_os(&self.var)
            .ok_or_else(|| KeyError::MissingEnv(self.var.clone()))?;
        let raw = value.to_string_lossy().into_owned().into_bytes();
        non_empty(raw, self.describe())
    }
}

/// Asks for a password on the terminal with hidden input.
pub struct PromptKeySource {
    prompt: String,
    confirm: bool,
}

impl PromptKeySource {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            confirm: false,
        }
    }

    /// Ask twice and require both entries to match.
    pub fn with_confirmation(mut self) -> Self {
        self.confirm = true;
        self
    }
}

impl KeySource for PromptKeySource {
    fn describe(&self) -> String {
        "prompt".to_string()
    }

    fn obtain(&self) -> Result<VaultKey> {
        let mut password = Password::new().with_prompt(&self.prompt);
        if self.confirm {
            password = password.with_confirmation("Confirm", "passwords do not match");
        }
        let value = password.interact().map_err(KeyError::Prompt)?;
        non_empty(value.into_bytes(), self.describe())
    }
}

/// Pick the password source for one side of the rekey.
///
/// A file wins over an environment variable; with neither, the terminal is
/// asked when there is one.
pub fn resolve(
    which: &'static str,
    file: Option<&PathBuf>,
    env: Option<&str>,
) -> Result<Box<dyn KeySource>> {
    if let Some(path) = file {
        return Ok(Box::new(FileKeySource::new(path.clone())));
    }
    if let Some(var) = env {
        return Ok(Box::new(EnvKeySource::new(var)));
    }
    if !io::stdin().is_terminal() {
        return Err(KeyError::NoSource(which).into());
    }

    let prompt = PromptKeySource::new(format!("{} vault password", capitalize(which)));
    if which == "new" {
        Ok(Box::new(prompt.with_confirmation()))
    } else {
        Ok(Box::new(prompt))
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

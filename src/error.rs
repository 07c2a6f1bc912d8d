//! Error types for vault2vault.
//!
//! Each concern has its own enum; [`Error`] wraps them for the command-line
//! layer. [`FileError`] is the per-file failure carried by a
//! [`FileReport`](crate::core::processor::FileReport) and never aborts a run.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error returned by the command-line layer.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("failed to serialize report: {0}")]
    Report(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration file and option errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Errors obtaining a vault password.
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("failed to read password file {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("password from {0} is empty")]
    Empty(String),

    #[error("environment variable {0} is not set")]
    MissingEnv(String),

    #[error("no {0} password source given")]
    NoSource(&'static str),

    #[error("password prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}

/// Errors raised by a vault cipher.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CipherError {
    #[error("not a vault envelope")]
    NotAnEnvelope,

    #[error("malformed vault envelope: {0}")]
    Malformed(String),

    #[error("unsupported vault format version: {0}")]
    UnsupportedVersion(String),

    #[error("unsupported vault cipher: {0}")]
    UnsupportedCipher(String),

    #[error("HMAC verification failed: wrong password or corrupted payload")]
    Authentication,

    #[error("invalid padding after decryption")]
    Padding,

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),
}

/// Structured document errors.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("not valid UTF-8 text")]
    NotText,

    #[error("not a YAML document: {0}")]
    Parse(#[source] serde_yaml::Error),

    #[error("no value at {0}")]
    NoSuchLocation(String),

    #[error("value at {0} is not a string scalar")]
    NotAString(String),

    #[error("value at {0} cannot be rewritten in place")]
    Unspliceable(String),
}

/// Failures of a single rekey operation.
#[derive(Error, Debug)]
pub enum RekeyError {
    #[error("unable to decrypt with the old password: {0}")]
    Undecryptable(#[source] CipherError),

    #[error("unable to encrypt with the new password: {0}")]
    Encrypt(#[source] CipherError),

    #[error("rekeyed payload does not decrypt to the original plaintext")]
    RoundTripMismatch,
}

impl RekeyError {
    /// Whether this error must stop the whole run, not just its file.
    pub fn is_internal(&self) -> bool {
        !matches!(self, Self::Undecryptable(_))
    }
}

/// Why a single file failed.
#[derive(Error, Debug)]
pub enum FileError {
    #[error("path does not exist")]
    NotFound,

    #[error("failed to read: {0}")]
    Read(#[source] std::io::Error),

    #[error("{}{source}", .location.as_deref().map(|l| format!("{l}: ")).unwrap_or_default())]
    Rekey {
        location: Option<String>,
        #[source]
        source: RekeyError,
    },

    #[error("failed to render document: {0}")]
    Render(#[source] DocumentError),

    #[error("failed to write backup: {0}")]
    Backup(#[source] std::io::Error),

    #[error("failed to write: {0}")]
    Write(#[source] std::io::Error),

    #[error("confirmation prompt failed: {0}")]
    Prompt(String),

    #[error("failed to walk directory: {0}")]
    Walk(String),
}

impl FileError {
    /// Whether the run should stop starting new files after this failure.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Rekey { source, .. } if source.is_internal())
    }
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

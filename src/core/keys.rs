//! Vault passwords and the sources they come from.

use std::fmt;

use zeroize::Zeroizing;

use crate::error::{KeyError, Result};

/// A vault password held in memory for the lifetime of the process.
///
/// Keys are only ever compared by use, so there is no `PartialEq`.
pub struct VaultKey(Zeroizing<Vec<u8>>);

impl VaultKey {
    /// Wrap raw password bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Zeroizing::new(bytes.into()))
    }

    /// The raw password bytes.
    pub fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VaultKey([REDACTED])")
    }
}

/// Something that can produce a vault password.
pub trait KeySource {
    /// Human-readable description used in error messages.
    fn describe(&self) -> String;

    /// Obtain the password.
    fn obtain(&self) -> Result<VaultKey>;
}

/// Strip surrounding whitespace from a password file's contents, the same
/// way ansible-vault reads `--vault-password-file`.
pub fn trim_password(raw: &[u8]) -> Vec<u8> {
    let is_space = |b: &u8| matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c);
    let start = raw.iter().position(|b| !is_space(b)).unwrap_or(raw.len());
    let end = raw.iter().rposition(|b| !is_space(b)).map_or(start, |i| i + 1);
    raw[start..end].to_vec()
}

/// Reject empty passwords.
pub fn non_empty(raw: Vec<u8>, origin: String) -> Result<VaultKey> {
    if raw.is_empty() {
        return Err(KeyError::Empty(origin).into());
    }
    Ok(VaultKey::new(raw))
}

//! Envelope detection.
//!
//! Structural, header-only recognition of vault payloads. Nothing here
//! decrypts; only a bounded prefix of the input is ever inspected.

use std::fmt;

use crate::core::constants::{DEFAULT_VAULT_ID, HEADER_SEPARATOR, MAX_HEADER_LEN, VAULT_MARKER};

/// What an envelope header declares about its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeInfo {
    version: String,
    cipher: String,
    vault_id: Option<String>,
}

impl EnvelopeInfo {
    /// Format version, e.g. `1.1` or `1.2`.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Cipher identifier, e.g. `AES256`.
    pub fn cipher(&self) -> &str {
        &self.cipher
    }

    /// The vault-id label, or `"default"` when the envelope is untagged.
    pub fn vault_id(&self) -> &str {
        self.vault_id.as_deref().unwrap_or(DEFAULT_VAULT_ID)
    }

    /// The vault-id label exactly as written, `None` when untagged.
    pub fn label(&self) -> Option<&str> {
        self.vault_id.as_deref()
    }

    /// Whether this envelope passes a vault-id filter.
    pub fn matches(&self, filter: &str) -> bool {
        self.vault_id() == filter
    }
}

impl fmt::Display for EnvelopeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{} ({})", self.cipher, self.version, self.vault_id())
    }
}

/// Detect a vault envelope at the start of `blob`.
///
/// Leading ASCII whitespace is ignored. Returns `None` unless the first line
/// is a well-formed header of at least marker, version and cipher.
pub fn detect(blob: &[u8]) -> Option<EnvelopeInfo> {
    let start = blob
        .iter()
        .take(MAX_HEADER_LEN)
        .position(|b| !b.is_ascii_whitespace())?;
    let window = &blob[start..blob.len().min(start + MAX_HEADER_LEN)];

    if !window.starts_with(VAULT_MARKER.as_bytes()) {
        return None;
    }

    let line = match window.iter().position(|b| *b == b'\n') {
        Some(end) => &window[..end],
        // header longer than the window is not a header we recognize
        None if blob.len() > start + window.len() => return None,
        None => window,
    };
    let line = std::str::from_utf8(line).ok()?.trim_end();

    let mut fields = line.split(HEADER_SEPARATOR);
    if fields.next()? != VAULT_MARKER {
        return None;
    }
    let version = fields.next()?.trim();
    let cipher = fields.next()?.trim();
    if version.is_empty() || cipher.is_empty() {
        return None;
    }
    let vault_id = fields
        .next()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from);

    Some(EnvelopeInfo {
        version: version.to_string(),
        cipher: cipher.to_string(),
        vault_id,
    })
}

/// Whether `blob` starts with a vault envelope header.
pub fn is_envelope(blob: &[u8]) -> bool {
    detect(blob).is_some()
}

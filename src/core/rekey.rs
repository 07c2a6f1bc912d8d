//! The rekey unit: one envelope in, one envelope (or a skip) out.
//!
//! Pure with respect to the filesystem.

use std::fmt;

use serde::Serialize;
use tracing::{debug, trace};

use crate::core::cipher::VaultCipher;
use crate::core::envelope;
use crate::core::keys::VaultKey;
use crate::error::{CipherError, RekeyError};

/// Knobs that decide what happens to a single envelope.
#[derive(Debug, Clone, Default)]
pub struct RekeyPolicy {
    /// Only envelopes with this vault-id are rekeyed (`default` = untagged).
    pub vault_id: Option<String>,
    /// Leave envelopes the old key cannot open untouched instead of failing.
    pub ignore_undecryptable: bool,
    /// Decrypt every new envelope with the new key before accepting it.
    pub verify: bool,
}

/// Successful result of a rekey attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rekeyed {
    /// The replacement envelope.
    Done(String),
    /// The envelope must be left exactly as it is.
    Skipped(SkipReason),
}

/// Why an envelope was left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// Vault-id did not match the filter.
    VaultIdMismatch { found: String },
    /// Old key could not decrypt it and undecryptable values are ignored.
    Undecryptable { error: String },
    /// Declined at the interactive prompt.
    Declined,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VaultIdMismatch { found } => write!(f, "vault-id '{}' does not match", found),
            Self::Undecryptable { error } => write!(f, "undecryptable, ignored ({})", error),
            Self::Declined => f.write_str("declined"),
        }
    }
}

/// Rekeys envelopes from an old key to a new one.
///
/// Keys are borrowed read-only for the whole run.
pub struct Rekeyer<'a> {
    cipher: &'a dyn VaultCipher,
    old_key: &'a VaultKey,
    new_key: &'a VaultKey,
    policy: &'a RekeyPolicy,
}

impl<'a> Rekeyer<'a> {
    pub fn new(
        cipher: &'a dyn VaultCipher,
        old_key: &'a VaultKey,
        new_key: &'a VaultKey,
        policy: &'a RekeyPolicy,
    ) -> Self {
        Self {
            cipher,
            old_key,
            new_key,
            policy,
        }
    }

    /// Rekey one envelope.
    ///
    /// The vault-id label (or its absence) is carried over unchanged.
    ///
    /// # Errors
    ///
    /// - `RekeyError::Undecryptable` when the old key fails and undecryptable
    ///   values are not ignored
    /// - `RekeyError::Encrypt` when the new envelope cannot be produced
    /// - `RekeyError::RoundTripMismatch` when verification fails; this is
    ///   never downgraded to a skip
    pub fn rekey(&self, envelope: &str) -> Result<Rekeyed, RekeyError> {
        let info = match envelope::detect(envelope.as_bytes()) {
            Some(info) => info,
            None => return self.undecryptable(CipherError::NotAnEnvelope),
        };

        if let Some(filter) = &self.policy.vault_id {
            if !info.matches(filter) {
                trace!(found = info.vault_id(), filter = %filter, "vault-id filtered");
                return Ok(Rekeyed::Skipped(SkipReason::VaultIdMismatch {
                    found: info.vault_id().to_string(),
                }));
            }
        }

        let plaintext = match self.cipher.decrypt(envelope, self.old_key) {
            Ok(plaintext) => plaintext,
            Err(e) => return self.undecryptable(e),
        };

        let rekeyed = self
            .cipher
            .encrypt(&plaintext, self.new_key, info.label())
            .map_err(RekeyError::Encrypt)?;

        if self.policy.verify {
            let check = self
                .cipher
                .decrypt(&rekeyed, self.new_key)
                .map_err(|_| RekeyError::RoundTripMismatch)?;
            let relabelled = envelope::detect(rekeyed.as_bytes())
                .map(|new| new.label() == info.label())
                .unwrap_or(false);
            if check.as_slice() != plaintext.as_slice() || !relabelled {
                return Err(RekeyError::RoundTripMismatch);
            }
            trace!("round trip verified");
        }

        Ok(Rekeyed::Done(rekeyed))
    }

    /// Rekey a whole file's contents.
    ///
    /// Bytes that are not UTF-8 cannot be an envelope and are treated like
    /// any other undecryptable payload.
    ///
    /// # Errors
    ///
    /// Same as [`Rekeyer::rekey`].
    pub fn rekey_bytes(&self, envelope: &[u8]) -> Result<Rekeyed, RekeyError> {
        match std::str::from_utf8(envelope) {
            Ok(text) => self.rekey(text),
            Err(e) => self.undecryptable(CipherError::Malformed(format!("not valid UTF-8: {}", e))),
        }
    }

    fn undecryptable(&self, error: CipherError) -> Result<Rekeyed, RekeyError> {
        if self.policy.ignore_undecryptable {
            debug!(error = %error, "undecryptable value ignored");
            Ok(Rekeyed::Skipped(SkipReason::Undecryptable {
                error: error.to_string(),
            }))
        } else {
            Err(RekeyError::Undecryptable(error))
        }
    }
}

//! Vault encryption primitive.
//!
//! The rekey engine only relies on the [`VaultCipher`] trait: encrypt a
//! plaintext into an envelope, and decrypt an envelope back. The shipped
//! implementation is [`AnsibleVault`], compatible with `ansible-vault`
//! AES256 payloads.
//!
//! ## Adding a New Backend
//!
//! 1. Implement the `VaultCipher` trait
//! 2. Add the implementation in a new file
//! 3. Re-export from this module

use zeroize::Zeroizing;

use crate::core::keys::VaultKey;
use crate::error::CipherError;

mod ansible;

pub use ansible::AnsibleVault;

/// Result type for cipher operations.
pub type CipherResult<T> = std::result::Result<T, CipherError>;

/// Symmetric, password-based envelope cipher.
pub trait VaultCipher: Sync {
    /// Encrypt `plaintext` under `key`, labelling the envelope with `vault_id`.
    ///
    /// Every call must draw fresh randomness: encrypting the same plaintext
    /// twice yields different envelopes.
    fn encrypt(
        &self,
        plaintext: &[u8],
        key: &VaultKey,
        vault_id: Option<&str>,
    ) -> CipherResult<String>;

    /// Decrypt an envelope.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::Authentication` when the key does not match, and
    /// other variants when the envelope is malformed. Never returns garbage.
    fn decrypt(&self, envelope: &str, key: &VaultKey) -> CipherResult<Zeroizing<Vec<u8>>>;
}

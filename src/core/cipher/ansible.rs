//! Ansible vault AES256 backend.
//!
//! Implements the payload format written by `ansible-vault`:
//!
//! ```text
//! $ANSIBLE_VAULT;1.2;AES256;prod
//! hex( hex(salt) \n hex(hmac) \n hex(ciphertext) )   wrapped at 80 columns
//! ```
//!
//! Key material is PBKDF2-HMAC-SHA256 over the password with a random 32-byte
//! salt (10 000 iterations, 80 bytes), split into an AES-256 key, an
//! HMAC-SHA256 key and a CTR initial counter block. The plaintext is PKCS#7
//! padded before AES-256-CTR, and the HMAC covers the ciphertext.

use std::num::NonZeroU32;

use aes::cipher::{KeyIvInit, StreamCipher};
use rand::RngCore;
use ring::{hmac, pbkdf2};
use tracing::trace;
use zeroize::Zeroizing;

use super::{CipherResult, VaultCipher};
use crate::core::constants::{
    BODY_WIDTH, CIPHER_AES256, DEFAULT_VAULT_ID, HEADER_SEPARATOR, VAULT_MARKER,
    VERSION_TAGGED, VERSION_UNTAGGED,
};
use crate::core::envelope;
use crate::core::keys::VaultKey;
use crate::error::CipherError;

/// AES-256-CTR with a big-endian 128-bit counter.
type Aes256Ctr = ctr::Ctr128BE<aes::Aes256>;

const SALT_LEN: usize = 32;
const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;
const BLOCK_LEN: usize = 16;
const MATERIAL_LEN: usize = 2 * KEY_LEN + IV_LEN;

const ITERATIONS: NonZeroU32 = match NonZeroU32::new(10_000) {
    Some(n) => n,
    None => panic!("PBKDF2 iteration count must be non-zero"),
};

/// `ansible-vault` compatible AES256 cipher.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnsibleVault;

/// Keys derived from a password and salt.
struct DerivedKeys {
    material: Zeroizing<[u8; MATERIAL_LEN]>,
}

impl DerivedKeys {
    fn derive(key: &VaultKey, salt: &[u8]) -> Self {
        let mut material = Zeroizing::new([0u8; MATERIAL_LEN]);
        pbkdf2::derive(
            pbkdf2::PBKDF2_HMAC_SHA256,
            ITERATIONS,
            salt,
            key.expose(),
            &mut material[..],
        );
        Self { material }
    }

    fn cipher_key(&self) -> &[u8] {
        &self.material[..KEY_LEN]
    }

    fn hmac_key(&self) -> hmac::Key {
        hmac::Key::new(hmac::HMAC_SHA256, &self.material[KEY_LEN..2 * KEY_LEN])
    }

    fn iv(&self) -> &[u8] {
        &self.material[2 * KEY_LEN..]
    }

    /// Apply the CTR keystream in place (encryption and decryption are the same).
    fn apply_keystream(&self, buf: &mut [u8]) -> CipherResult<()> {
        let mut cipher = Aes256Ctr::new_from_slices(self.cipher_key(), self.iv())
            .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;
        cipher.apply_keystream(buf);
        Ok(())
    }
}

impl VaultCipher for AnsibleVault {
    fn encrypt(
        &self,
        plaintext: &[u8],
        key: &VaultKey,
        vault_id: Option<&str>,
    ) -> CipherResult<String> {
        trace!(plaintext_len = plaintext.len(), "encrypting");

        let header = header_line(vault_id)?;

        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let keys = DerivedKeys::derive(key, &salt);

        let mut ciphertext = pad(plaintext);
        keys.apply_keystream(&mut ciphertext)?;
        let tag = hmac::sign(&keys.hmac_key(), &ciphertext);

        let inner = format!(
            "{}\n{}\n{}",
            hex::encode(salt),
            hex::encode(tag.as_ref()),
            hex::encode(&ciphertext)
        );
        let body = hex::encode(inner.as_bytes());

        trace!(body_len = body.len(), "encrypted");

        Ok(wrap(&header, &body))
    }

    fn decrypt(&self, envelope: &str, key: &VaultKey) -> CipherResult<Zeroizing<Vec<u8>>> {
        trace!(envelope_len = envelope.len(), "decrypting");

        let info = envelope::detect(envelope.as_bytes()).ok_or(CipherError::NotAnEnvelope)?;
        if info.cipher() != CIPHER_AES256 {
            return Err(CipherError::UnsupportedCipher(info.cipher().to_string()));
        }
        if info.version() != VERSION_UNTAGGED && info.version() != VERSION_TAGGED {
            return Err(CipherError::UnsupportedVersion(info.version().to_string()));
        }

        let body: String = envelope
            .trim_start()
            .lines()
            .skip(1)
            .map(str::trim)
            .collect();
        let inner = hex::decode(&body)
            .map_err(|e| CipherError::Malformed(format!("envelope body: {}", e)))?;

        let mut sections = inner.split(|b| *b == b'\n');
        let (salt, mac, ciphertext) =
            match (sections.next(), sections.next(), sections.next(), sections.next()) {
                (Some(salt), Some(mac), Some(ciphertext), None) => (
                    decode_section(salt, "salt")?,
                    decode_section(mac, "hmac")?,
                    decode_section(ciphertext, "ciphertext")?,
                ),
                _ => {
                    return Err(CipherError::Malformed(
                        "expected salt, hmac and ciphertext sections".to_string(),
                    ))
                }
            };

        if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
            return Err(CipherError::Malformed(format!(
                "ciphertext length {} is not a multiple of {}",
                ciphertext.len(),
                BLOCK_LEN
            )));
        }

        let keys = DerivedKeys::derive(key, &salt);
        hmac::verify(&keys.hmac_key(), &ciphertext, &mac)
            .map_err(|_| CipherError::Authentication)?;

        let mut plaintext = Zeroizing::new(ciphertext);
        keys.apply_keystream(&mut plaintext)?;
        unpad(&mut plaintext)?;

        trace!(plaintext_len = plaintext.len(), "decrypted");

        Ok(plaintext)
    }
}

/// Build the header line for an optional vault-id.
fn header_line(vault_id: Option<&str>) -> CipherResult<String> {
    match vault_id.filter(|id| !id.is_empty() && *id != DEFAULT_VAULT_ID) {
        Some(id) => {
            if id.contains(HEADER_SEPARATOR) || id.contains(char::is_whitespace) {
                return Err(CipherError::EncryptionFailed(format!(
                    "invalid vault-id: {:?}",
                    id
                )));
            }
            Ok(format!(
                "{VAULT_MARKER};{VERSION_TAGGED};{CIPHER_AES256};{id}"
            ))
        }
        None => Ok(format!("{VAULT_MARKER};{VERSION_UNTAGGED};{CIPHER_AES256}")),
    }
}

/// Join the header and the hex body wrapped at [`BODY_WIDTH`] columns.
fn wrap(header: &str, body: &str) -> String {
    let mut out = String::with_capacity(header.len() + body.len() + body.len() / BODY_WIDTH + 2);
    out.push_str(header);
    out.push('\n');
    // body is ASCII hex, so byte offsets are char boundaries
    let mut start = 0;
    while start < body.len() {
        let end = (start + BODY_WIDTH).min(body.len());
        out.push_str(&body[start..end]);
        out.push('\n');
        start = end;
    }
    out
}

fn decode_section(raw: &[u8], name: &str) -> CipherResult<Vec<u8>> {
    hex::decode(raw).map_err(|e| CipherError::Malformed(format!("{}: {}", name, e)))
}

/// PKCS#7 pad to the AES block size.
fn pad(plaintext: &[u8]) -> Vec<u8> {
    let n = BLOCK_LEN - plaintext.len() % BLOCK_LEN;
    let mut out = Vec::with_capacity(plaintext.len() + n);
    out.extend_from_slice(plaintext);
    out.resize(plaintext.len() + n, n as u8);
    out
}

/// Strip PKCS#7 padding in place.
fn unpad(buf: &mut Vec<u8>) -> CipherResult<()> {
    let n = *buf.last().ok_or(CipherError::Padding)? as usize;
    if n == 0 || n > BLOCK_LEN || n > buf.len() {
        return Err(CipherError::Padding);
    }
    if !buf[buf.len() - n..].iter().all(|b| *b as usize == n) {
        return Err(CipherError::Padding);
    }
    buf.truncate(buf.len() - n);
    Ok(())
}

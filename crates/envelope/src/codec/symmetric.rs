//! Secret-based AEAD codec for the v1 (legacy) and v2 (enhanced) generations.

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use super::Envelope;
use crate::crypto::{cipher, kdf, random::random_array, IV_LEN};
use crate::error::{CryptoError, CryptoResult};
use crate::version::EncryptionVersion;

/// Byte length of the per-message v2 salt.
pub const SALT_LEN: usize = 16;

/// Default PBKDF2 iteration count for v2 key derivation.
pub const DEFAULT_KDF_ITERATIONS: u32 = 100_000;

/// Password/shared-secret codec.
///
/// The PBKDF2 iteration count is not stored in the envelope, so every codec
/// that reads a v2 envelope must be configured with the count that wrote it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymmetricCodec {
    kdf_iterations: u32,
}

impl Default for SymmetricCodec {
    fn default() -> Self {
        Self::with_iterations(DEFAULT_KDF_ITERATIONS)
    }
}

impl SymmetricCodec {
    pub fn with_iterations(kdf_iterations: u32) -> Self {
        Self { kdf_iterations }
    }

    pub fn kdf_iterations(&self) -> u32 {
        self.kdf_iterations
    }

    /// Encrypt `plaintext` as a v2 envelope.
    ///
    /// Draws a fresh salt and IV per call, so identical inputs never produce
    /// identical output.
    pub fn encrypt(&self, plaintext: &str, secret: &str) -> CryptoResult<Envelope> {
        let salt = fresh_salt();
        let key = kdf::derive_key(secret, &salt, self.kdf_iterations);
        let sealed = cipher::seal(plaintext.as_bytes(), &key)?;

        let mut payload = Vec::with_capacity(SALT_LEN + IV_LEN + sealed.ciphertext.len());
        payload.extend_from_slice(&salt);
        payload.extend_from_slice(&sealed.iv);
        payload.extend_from_slice(&sealed.ciphertext);
        Ok(Envelope::new(EncryptionVersion::Enhanced, payload))
    }

    /// Encrypt `plaintext` as a v1 envelope.
    ///
    /// New data should use [`SymmetricCodec::encrypt`]; this exists so legacy
    /// ciphertext can be produced for compatibility checks.
    pub fn encrypt_legacy(&self, plaintext: &str, secret: &str) -> CryptoResult<Envelope> {
        let key = kdf::legacy_key(secret);
        let sealed = cipher::seal(plaintext.as_bytes(), &key)?;

        let mut payload = Vec::with_capacity(IV_LEN + sealed.ciphertext.len());
        payload.extend_from_slice(&sealed.iv);
        payload.extend_from_slice(&sealed.ciphertext);
        Ok(Envelope::new(EncryptionVersion::Legacy, payload))
    }

    /// Decrypt a v1 or v2 envelope.
    ///
    /// v1 and v2 carry no tag, and a v1 payload of at least salt + IV + tag
    /// bytes has the v2 shape, so an envelope decoded from text as Enhanced
    /// is retried as Legacy when the v2 layout does not authenticate.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::UnsupportedVersion`] for a v3 envelope.
    /// - [`CryptoError::Authentication`] for a wrong secret or tampered data.
    /// - [`CryptoError::Decode`] for a truncated layout or non-UTF-8 plaintext.
    pub fn decrypt(&self, envelope: &Envelope, secret: &str) -> CryptoResult<String> {
        match envelope.version() {
            EncryptionVersion::Legacy => self.decrypt_as_legacy(envelope, secret),
            EncryptionVersion::Enhanced => self.decrypt_untagged(envelope, secret),
            EncryptionVersion::Quantum => {
                Err(CryptoError::unsupported(EncryptionVersion::Quantum, "symmetric"))
            }
        }
    }

    /// Try the v2 layout, then v1. On double failure the v2 error wins.
    pub(crate) fn decrypt_untagged(
        &self,
        envelope: &Envelope,
        secret: &str,
    ) -> CryptoResult<String> {
        match self.decrypt_as_enhanced(envelope, secret) {
            Ok(plaintext) => Ok(plaintext),
            Err(e @ (CryptoError::Authentication | CryptoError::Decode(_))) => {
                match self.decrypt_as_legacy(envelope, secret) {
                    Ok(plaintext) => {
                        debug!("v2-shaped envelope opened with the v1 layout");
                        Ok(plaintext)
                    }
                    Err(_) => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    fn decrypt_as_legacy(
        &self,
        envelope: &Envelope,
        secret: &str,
    ) -> CryptoResult<String> {
        let payload = envelope.payload();
        if payload.len() < IV_LEN {
            return Err(CryptoError::Decode("v1 envelope shorter than its IV".into()));
        }
        let (iv, ciphertext) = payload.split_at(IV_LEN);
        let key = kdf::legacy_key(secret);
        into_utf8(cipher::open(iv, ciphertext, &key)?)
    }

    fn decrypt_as_enhanced(&self, envelope: &Envelope, secret: &str) -> CryptoResult<String> {
        let payload = envelope.payload();
        if payload.len() < SALT_LEN + IV_LEN {
            return Err(CryptoError::Decode("v2 envelope shorter than salt and IV".into()));
        }
        let (salt, rest) = payload.split_at(SALT_LEN);
        let (iv, ciphertext) = rest.split_at(IV_LEN);
        let key = kdf::derive_key(secret, salt, self.kdf_iterations);
        into_utf8(cipher::open(iv, ciphertext, &key)?)
    }

    /// Serialise `value` as JSON and encrypt it as a v2 envelope.
    pub fn encrypt_json<T: Serialize>(&self, value: &T, secret: &str) -> CryptoResult<Envelope> {
        let json = serde_json::to_string(value)?;
        self.encrypt(&json, secret)
    }

    /// Decrypt an envelope and deserialise the JSON it contains.
    pub fn decrypt_json<T: DeserializeOwned>(
        &self,
        envelope: &Envelope,
        secret: &str,
    ) -> CryptoResult<T> {
        let json = self.decrypt(envelope, secret)?;
        let value = serde_json::from_str(&json)?;
        debug!(version = %envelope.version(), "decrypted structured value");
        Ok(value)
    }
}

/// Random salt that never starts with the v3 tag byte, so a fresh v2
/// envelope can never be mistaken for v3.
fn fresh_salt() -> [u8; SALT_LEN] {
    loop {
        let salt = random_array::<SALT_LEN>();
        if salt[0] != EncryptionVersion::Quantum.tag() {
            return salt;
        }
    }
}

fn into_utf8(bytes: Vec<u8>) -> CryptoResult<String> {
    String::from_utf8(bytes)
        .map_err(|_| CryptoError::Decode("plaintext is not valid UTF-8".into()))
}

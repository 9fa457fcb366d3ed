//! AES-256-GCM sealing and opening of raw byte payloads.
//!
//! **Algorithm choice:** AES-256-GCM with a random 96-bit IV per call and a
//! 128-bit tag. Every envelope generation uses this AEAD; they differ only in
//! how the key is derived and how the fields are framed.
//!
//! **Never reuse an IV under the same key.** GCM nonce reuse breaks both
//! confidentiality and authentication, which is why [`seal`] draws the IV
//! itself instead of accepting one.

use aes_gcm::{
    aead::{rand_core::RngCore, Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};

use crate::error::{CryptoError, CryptoResult};
use crate::secret::AeadKey;

/// Byte length of an AES-GCM IV (12 bytes = 96 bits).
pub const IV_LEN: usize = 12;

/// Byte length of the AES-GCM authentication tag.
pub const TAG_LEN: usize = 16;

/// Output of [`seal`]: the IV it drew and the ciphertext with tag appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    /// Raw IV bytes.
    pub iv: [u8; IV_LEN],
    /// Raw ciphertext + authentication tag bytes.
    pub ciphertext: Vec<u8>,
}

/// Encrypt `plaintext` under `key` with a fresh IV from the OS CSPRNG.
///
/// # Errors
///
/// Returns [`CryptoError::Encryption`] on an internal AEAD error (unreachable
/// with a valid key and IV).
pub fn seal(plaintext: &[u8], key: &AeadKey) -> CryptoResult<Sealed> {
    let cipher = build_cipher(key)?;

    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|_| CryptoError::Encryption("aead seal failed".into()))?;

    Ok(Sealed { iv, ciphertext })
}

/// Decrypt `ciphertext` (tag appended) under `key` and `iv`.
///
/// # Errors
///
/// Returns [`CryptoError::Decode`] if `iv` is not [`IV_LEN`] bytes or the
/// ciphertext is shorter than a tag, and [`CryptoError::Authentication`] if
/// the tag does not verify (wrong key or tampered data).
pub fn open(iv: &[u8], ciphertext: &[u8], key: &AeadKey) -> CryptoResult<Vec<u8>> {
    if iv.len() != IV_LEN {
        return Err(CryptoError::Decode(format!(
            "IV must be {IV_LEN} bytes, got {}",
            iv.len()
        )));
    }
    if ciphertext.len() < TAG_LEN {
        return Err(CryptoError::Decode("ciphertext shorter than tag".into()));
    }
    let cipher = build_cipher(key)?;
    cipher
        .decrypt(Nonce::from_slice(iv), ciphertext)
        .map_err(|_| CryptoError::Authentication)
}

fn build_cipher(key: &AeadKey) -> CryptoResult<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| CryptoError::InvalidKey {
        kind: "AES-256 key",
        expected: crate::secret::KEY_LEN,
        actual: key.as_bytes().len(),
    })
}

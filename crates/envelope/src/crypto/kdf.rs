//! Key derivation and one-way hashing.

use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2_hmac;
use sha2::{Digest, Sha256};

use crate::error::{CryptoError, CryptoResult};
use crate::secret::{AeadKey, KEY_LEN};

type HmacSha256 = Hmac<Sha256>;

/// Derive the v2 AEAD key from a shared secret and a per-message salt
/// with PBKDF2-HMAC-SHA256.
pub fn derive_key(secret: &str, salt: &[u8], iterations: u32) -> AeadKey {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(secret.as_bytes(), salt, iterations, &mut key);
    AeadKey::from_array(key)
}

/// Derive the unsalted v1 AEAD key: SHA-256 of the secret.
pub fn legacy_key(secret: &str) -> AeadKey {
    AeadKey::from_array(Sha256::digest(secret.as_bytes()).into())
}

/// Derive the v3 AEAD key from a KEM shared secret.
///
/// Uses the first 32 bytes. ML-KEM-768 shared secrets are exactly 32 bytes,
/// so the truncation is a no-op for the chosen parameter set.
pub fn key_from_shared_secret(shared_secret: &[u8]) -> CryptoResult<AeadKey> {
    AeadKey::from_prefix(shared_secret).ok_or(CryptoError::InvalidKey {
        kind: "KEM shared secret",
        expected: KEY_LEN,
        actual: shared_secret.len(),
    })
}

/// One-way hex digest of `data`.
///
/// Plain SHA-256 without a salt; HMAC-SHA256 keyed by the salt otherwise.
pub fn hash_data(data: &str, salt: Option<&str>) -> CryptoResult<String> {
    match salt {
        None => Ok(hex::encode(Sha256::digest(data.as_bytes()))),
        Some(salt) => {
            let mut mac = HmacSha256::new_from_slice(salt.as_bytes())
                .map_err(|e| CryptoError::Encryption(format!("HMAC salt rejected: {e}")))?;
            mac.update(data.as_bytes());
            Ok(hex::encode(mac.finalize().into_bytes()))
        }
    }
}

//! Error taxonomy for the envelope codecs.

use thiserror::Error;

use crate::version::EncryptionVersion;

/// Result alias used throughout the crate.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors produced by the primitive adapter, the codecs and the migrator.
///
/// Cryptographic failures are never downgraded to a default value; every
/// failure reaches the caller as one of these variants.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// AEAD tag mismatch: wrong key, tampered ciphertext, or an envelope fed
    /// to the wrong codec.
    #[error("authentication failed (wrong key or tampered data)")]
    Authentication,

    /// The leading byte or structure matches no known generation.
    #[error("unsupported envelope version: {0}")]
    UnsupportedVersion(String),

    /// Signature verification failed; decryption was not attempted.
    #[error("signature verification failed")]
    InvalidSignature,

    /// Malformed base64, truncated binary layout, or non-UTF-8 plaintext.
    #[error("decode error: {0}")]
    Decode(String),

    /// Raw key material has the wrong length for its algorithm.
    #[error("invalid {kind} length: expected {expected} bytes, got {actual}")]
    InvalidKey {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },

    /// AEAD encryption failed (unreachable with a valid key and IV).
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// JSON (de)serialisation of a structured value failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CryptoError {
    pub(crate) fn unsupported(version: EncryptionVersion, codec: &str) -> Self {
        CryptoError::UnsupportedVersion(format!("{version} envelope passed to the {codec} codec"))
    }
}

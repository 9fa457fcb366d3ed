//! ML-DSA-65 detached signatures.

use pqcrypto_mldsa::mldsa65;
use pqcrypto_traits::sign::{DetachedSignature as _, PublicKey as _, SecretKey as _};

use crate::error::{CryptoError, CryptoResult};
use crate::secret::SecretBytes;

/// Sender verifying (public) key.
#[derive(Clone, PartialEq, Eq)]
pub struct VerifyingKey(Vec<u8>);

impl VerifyingKey {
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        mldsa65::PublicKey::from_bytes(bytes).map_err(|_| CryptoError::InvalidKey {
            kind: "ML-DSA-65 verifying key",
            expected: mldsa65::public_key_bytes(),
            actual: bytes.len(),
        })?;
        Ok(Self(bytes.to_vec()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VerifyingKey({} bytes)", self.0.len())
    }
}

/// Sender signing (secret) key. Zeroized on drop.
#[derive(Clone, Debug)]
pub struct SigningKey(SecretBytes);

impl SigningKey {
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        mldsa65::SecretKey::from_bytes(bytes).map_err(|_| CryptoError::InvalidKey {
            kind: "ML-DSA-65 signing key",
            expected: mldsa65::secret_key_bytes(),
            actual: bytes.len(),
        })?;
        Ok(Self(SecretBytes::from(bytes)))
    }

    pub fn expose(&self) -> &[u8] {
        self.0.expose()
    }
}

/// Signature keypair for one sender identity.
#[derive(Clone, Debug)]
pub struct SignatureKeyPair {
    pub public: VerifyingKey,
    pub secret: SigningKey,
}

/// Generate a fresh ML-DSA-65 keypair.
pub fn generate_signature_keypair() -> SignatureKeyPair {
    let (pk, sk) = mldsa65::keypair();
    SignatureKeyPair {
        public: VerifyingKey(pk.as_bytes().to_vec()),
        secret: SigningKey(SecretBytes::from(sk.as_bytes())),
    }
}

/// Produce a detached signature over `message`.
pub fn sign(message: &[u8], key: &SigningKey) -> CryptoResult<Vec<u8>> {
    let sk = mldsa65::SecretKey::from_bytes(key.expose()).map_err(|_| CryptoError::InvalidKey {
        kind: "ML-DSA-65 signing key",
        expected: mldsa65::secret_key_bytes(),
        actual: key.expose().len(),
    })?;
    Ok(mldsa65::detached_sign(message, &sk).as_bytes().to_vec())
}

/// Verify a detached signature over `message`.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidSignature`] for a malformed or non-matching
/// signature.
pub fn verify(message: &[u8], signature: &[u8], key: &VerifyingKey) -> CryptoResult<()> {
    let pk = mldsa65::PublicKey::from_bytes(key.as_bytes()).map_err(|_| CryptoError::InvalidKey {
        kind: "ML-DSA-65 verifying key",
        expected: mldsa65::public_key_bytes(),
        actual: key.as_bytes().len(),
    })?;
    let sig = mldsa65::DetachedSignature::from_bytes(signature)
        .map_err(|_| CryptoError::InvalidSignature)?;
    mldsa65::verify_detached_signature(&sig, message, &pk)
        .map_err(|_| CryptoError::InvalidSignature)
}

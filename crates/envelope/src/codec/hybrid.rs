//! ML-KEM-768 + AES-256-GCM hybrid codec (v3), with optional ML-DSA-65
//! signatures over the ciphertext.
//!
//! # Layout
//!
//! ```text
//! offset 0            1                 1 + 1088      1 + 1088 + 12
//!        | tag = 0x03 | kem ciphertext  | iv          | aead ciphertext + tag |
//! ```
//!
//! The KEM ciphertext length is fixed for the parameter set, so fields are
//! sliced by constant offsets without a length prefix.

use tracing::debug;

use super::{Envelope, SignedEnvelope};
use crate::crypto::kem::{decapsulate, encapsulate};
use crate::crypto::{
    cipher, kdf, sign, KemPublicKey, KemSecretKey, SigningKey, VerifyingKey, IV_LEN,
    KEM_CIPHERTEXT_LEN, TAG_LEN,
};
use crate::error::{CryptoError, CryptoResult};
use crate::version::EncryptionVersion;

pub use crate::crypto::{generate_kem_keypair, generate_signature_keypair};

const KEM_CT_OFFSET: usize = 1;
const IV_OFFSET: usize = KEM_CT_OFFSET + KEM_CIPHERTEXT_LEN;
const BODY_OFFSET: usize = IV_OFFSET + IV_LEN;

/// Minimum decoded length of a v3 envelope (empty plaintext).
pub const V3_MIN_LEN: usize = BODY_OFFSET + TAG_LEN;

/// Encrypt `plaintext` for the holder of `recipient`'s secret key.
pub fn hybrid_encrypt(plaintext: &str, recipient: &KemPublicKey) -> CryptoResult<Envelope> {
    let encapsulated = encapsulate(recipient)?;
    let key = kdf::key_from_shared_secret(encapsulated.shared_secret.expose())?;
    drop(encapsulated.shared_secret);

    let sealed = cipher::seal(plaintext.as_bytes(), &key)?;

    let mut payload = Vec::with_capacity(BODY_OFFSET + sealed.ciphertext.len());
    payload.push(EncryptionVersion::Quantum.tag());
    payload.extend_from_slice(&encapsulated.ciphertext);
    payload.extend_from_slice(&sealed.iv);
    payload.extend_from_slice(&sealed.ciphertext);
    Ok(Envelope::new(EncryptionVersion::Quantum, payload))
}

/// Decrypt a v3 envelope with the recipient's KEM secret key.
///
/// # Errors
///
/// - [`CryptoError::UnsupportedVersion`] if the envelope is not v3.
/// - [`CryptoError::Decode`] if it is shorter than the fixed layout.
/// - [`CryptoError::Authentication`] for a wrong key or tampered data.
pub fn hybrid_decrypt(envelope: &Envelope, secret: &KemSecretKey) -> CryptoResult<String> {
    let payload = envelope.payload();
    match envelope.version() {
        EncryptionVersion::Quantum => {}
        other @ (EncryptionVersion::Legacy | EncryptionVersion::Enhanced) => {
            return Err(CryptoError::unsupported(other, "hybrid"));
        }
    }
    match payload.first() {
        Some(&tag) if tag == EncryptionVersion::Quantum.tag() => {}
        Some(&tag) => {
            return Err(CryptoError::UnsupportedVersion(format!(
                "leading byte {tag} is not the v3 tag"
            )));
        }
        None => return Err(CryptoError::Decode("empty envelope".into())),
    }
    if payload.len() < V3_MIN_LEN {
        return Err(CryptoError::Decode(format!(
            "v3 envelope must be at least {V3_MIN_LEN} bytes, got {}",
            payload.len()
        )));
    }

    let kem_ciphertext = &payload[KEM_CT_OFFSET..IV_OFFSET];
    let iv = &payload[IV_OFFSET..BODY_OFFSET];
    let body = &payload[BODY_OFFSET..];

    let shared_secret = decapsulate(kem_ciphertext, secret)?;
    let key = kdf::key_from_shared_secret(shared_secret.expose())?;
    drop(shared_secret);

    let plaintext = cipher::open(iv, body, &key)?;
    String::from_utf8(plaintext)
        .map_err(|_| CryptoError::Decode("plaintext is not valid UTF-8".into()))
}

/// Encrypt for `recipient`, then sign the resulting ciphertext bytes.
///
/// Signing the ciphertext rather than the plaintext lets a verifier check
/// authenticity without decryption rights, and stripping the signature and
/// re-encrypting invalidates it.
pub fn sign_and_encrypt(
    plaintext: &str,
    sender: &SigningKey,
    recipient: &KemPublicKey,
) -> CryptoResult<SignedEnvelope> {
    let encrypted = hybrid_encrypt(plaintext, recipient)?;
    let signature = sign::sign(encrypted.payload(), sender)?;
    Ok(SignedEnvelope {
        encrypted,
        signature,
    })
}

/// Verify the sender's signature, then decrypt.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidSignature`] without attempting decryption if
/// the signature does not verify.
pub fn verify_and_decrypt(
    signed: &SignedEnvelope,
    sender: &VerifyingKey,
    recipient: &KemSecretKey,
) -> CryptoResult<String> {
    if let Err(e) = sign::verify(signed.encrypted.payload(), &signed.signature, sender) {
        debug!("signature rejected, skipping decryption");
        return Err(e);
    }
    hybrid_decrypt(&signed.encrypted, recipient)
}

//! ML-KEM-768 key encapsulation.

use pqcrypto_mlkem::mlkem768;
use pqcrypto_traits::kem::{
    Ciphertext as _, PublicKey as _, SecretKey as _, SharedSecret as _,
};

use crate::error::{CryptoError, CryptoResult};
use crate::secret::SecretBytes;

/// ML-KEM-768 public key length.
pub const KEM_PUBLIC_KEY_LEN: usize = 1184;
/// ML-KEM-768 secret key length.
pub const KEM_SECRET_KEY_LEN: usize = 2400;
/// ML-KEM-768 ciphertext length; fixed, so v3 envelopes need no length prefix.
pub const KEM_CIPHERTEXT_LEN: usize = 1088;
/// ML-KEM-768 shared secret length.
pub const KEM_SHARED_SECRET_LEN: usize = 32;

/// Recipient public key. Safe to share.
#[derive(Clone, PartialEq, Eq)]
pub struct KemPublicKey(Vec<u8>);

impl KemPublicKey {
    /// Reconstruct a public key from its raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        check_len("ML-KEM-768 public key", KEM_PUBLIC_KEY_LEN, bytes.len())?;
        Ok(Self(bytes.to_vec()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for KemPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KemPublicKey({} bytes)", self.0.len())
    }
}

/// Recipient secret key. Zeroized on drop, redacted in `Debug`.
#[derive(Clone, Debug)]
pub struct KemSecretKey(SecretBytes);

impl KemSecretKey {
    /// Reconstruct a secret key from its raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        check_len("ML-KEM-768 secret key", KEM_SECRET_KEY_LEN, bytes.len())?;
        Ok(Self(SecretBytes::from(bytes)))
    }

    /// Borrow the raw bytes for persistence by the caller.
    pub fn expose(&self) -> &[u8] {
        self.0.expose()
    }
}

/// KEM keypair for one identity.
#[derive(Clone, Debug)]
pub struct KemKeyPair {
    pub public: KemPublicKey,
    pub secret: KemSecretKey,
}

/// Ephemeral output of one encapsulation.
///
/// The shared secret must be consumed immediately to derive a symmetric key
/// and then dropped.
#[derive(Debug)]
pub struct EncapsulatedKey {
    pub ciphertext: Vec<u8>,
    pub shared_secret: SecretBytes,
}

/// Generate a fresh ML-KEM-768 keypair.
pub fn generate_kem_keypair() -> KemKeyPair {
    let (pk, sk) = mlkem768::keypair();
    KemKeyPair {
        public: KemPublicKey(pk.as_bytes().to_vec()),
        secret: KemSecretKey(SecretBytes::from(sk.as_bytes())),
    }
}

/// Encapsulate a fresh shared secret against `recipient`.
pub fn encapsulate(recipient: &KemPublicKey) -> CryptoResult<EncapsulatedKey> {
    let pk = mlkem768::PublicKey::from_bytes(recipient.as_bytes())
        .map_err(|_| CryptoError::Encryption("invalid ML-KEM-768 public key".into()))?;
    let (ss, ct) = mlkem768::encapsulate(&pk);
    Ok(EncapsulatedKey {
        ciphertext: ct.as_bytes().to_vec(),
        shared_secret: SecretBytes::from(ss.as_bytes()),
    })
}

/// Recover the shared secret from `ciphertext` with the recipient's secret key.
///
/// ML-KEM uses implicit rejection: a wrong key or tampered ciphertext yields an
/// unrelated shared secret rather than an error, so the failure surfaces as
/// [`CryptoError::Authentication`] at the AEAD layer.
pub fn decapsulate(ciphertext: &[u8], secret: &KemSecretKey) -> CryptoResult<SecretBytes> {
    if ciphertext.len() != KEM_CIPHERTEXT_LEN {
        return Err(CryptoError::Decode(format!(
            "ML-KEM-768 ciphertext must be {KEM_CIPHERTEXT_LEN} bytes, got {}",
            ciphertext.len()
        )));
    }
    let ct = mlkem768::Ciphertext::from_bytes(ciphertext)
        .map_err(|_| CryptoError::Decode("invalid ML-KEM-768 ciphertext".into()))?;
    let sk = mlkem768::SecretKey::from_bytes(secret.expose()).map_err(|_| CryptoError::InvalidKey {
        kind: "ML-KEM-768 secret key",
        expected: KEM_SECRET_KEY_LEN,
        actual: secret.expose().len(),
    })?;
    let ss = mlkem768::decapsulate(&ct, &sk);
    Ok(SecretBytes::from(ss.as_bytes()))
}

fn check_len(kind: &'static str, expected: usize, actual: usize) -> CryptoResult<()> {
    if expected != actual {
        return Err(CryptoError::InvalidKey {
            kind,
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_match_the_parameter_set() {
        assert_eq!(mlkem768::public_key_bytes(), KEM_PUBLIC_KEY_LEN);
        assert_eq!(mlkem768::secret_key_bytes(), KEM_SECRET_KEY_LEN);
        assert_eq!(mlkem768::ciphertext_bytes(), KEM_CIPHERTEXT_LEN);
        assert_eq!(mlkem768::shared_secret_bytes(), KEM_SHARED_SECRET_LEN);
    }

    #[test]
    fn encapsulate_decapsulate_agree() {
        let kp = generate_kem_keypair();
        let encapsulated = encapsulate(&kp.public).unwrap();
        assert_eq!(encapsulated.ciphertext.len(), KEM_CIPHERTEXT_LEN);
        let recovered = decapsulate(&encapsulated.ciphertext, &kp.secret).unwrap();
        assert_eq!(recovered.expose(), encapsulated.shared_secret.expose());
    }

    #[test]
    fn wrong_secret_key_yields_different_secret() {
        let kp = generate_kem_keypair();
        let other = generate_kem_keypair();
        let encapsulated = encapsulate(&kp.public).unwrap();
        let recovered = decapsulate(&encapsulated.ciphertext, &other.secret).unwrap();
        assert_ne!(recovered.expose(), encapsulated.shared_secret.expose());
    }

    #[test]
    fn keys_round_trip_through_bytes() {
        let kp = generate_kem_keypair();
        let pk = KemPublicKey::from_bytes(kp.public.as_bytes()).unwrap();
        let sk = KemSecretKey::from_bytes(kp.secret.expose()).unwrap();
        assert_eq!(pk, kp.public);
        assert_eq!(sk.expose(), kp.secret.expose());
    }

    #[test]
    fn wrong_length_keys_rejected() {
        assert!(matches!(
            KemPublicKey::from_bytes(&[0u8; 32]),
            Err(CryptoError::InvalidKey { expected: KEM_PUBLIC_KEY_LEN, actual: 32, .. })
        ));
        assert!(KemSecretKey::from_bytes(&[0u8; 32]).is_err());
        let kp = generate_kem_keypair();
        assert!(decapsulate(&[0u8; 10], &kp.secret).is_err());
    }

    #[test]
    fn secret_key_redacted_in_debug() {
        let kp = generate_kem_keypair();
        assert!(format!("{:?}", kp.secret).contains("REDACTED"));
    }
}

//! Primitive library adapter.
//!
//! Thin, swappable bindings to the cryptographic primitives the codecs build
//! on. Nothing in here knows about envelope framing or versions.
//!
//! | concern   | primitive              | crate            |
//! |-----------|------------------------|------------------|
//! | AEAD      | AES-256-GCM            | `aes-gcm`        |
//! | KDF       | PBKDF2-HMAC-SHA256     | `pbkdf2`         |
//! | hash      | SHA-256 / HMAC-SHA256  | `sha2`, `hmac`   |
//! | KEM       | ML-KEM-768             | `pqcrypto-mlkem` |
//! | signature | ML-DSA-65              | `pqcrypto-mldsa` |
//! | random    | OS CSPRNG              | `aead::OsRng`    |

pub mod cipher;
pub mod kdf;
pub mod kem;
pub mod random;
pub mod sign;

pub use cipher::{IV_LEN, TAG_LEN};
pub use kem::{
    generate_kem_keypair, EncapsulatedKey, KemKeyPair, KemPublicKey, KemSecretKey,
    KEM_CIPHERTEXT_LEN,
};
pub use random::{generate_secure_token, DEFAULT_TOKEN_BYTES};
pub use sign::{generate_signature_keypair, SignatureKeyPair, SigningKey, VerifyingKey};

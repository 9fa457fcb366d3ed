//! Multi-version envelope encryption for sensitive records.
//!
//! Three envelope generations coexist and are told apart from the bytes alone:
//!
//! | version | key                                   | layout                          |
//! |---------|---------------------------------------|---------------------------------|
//! | v1      | SHA-256(secret)                       | `iv ‖ ct`                       |
//! | v2      | PBKDF2-HMAC-SHA256(secret, salt)      | `salt ‖ iv ‖ ct`                |
//! | v3      | ML-KEM-768 shared secret              | `0x03 ‖ kem_ct ‖ iv ‖ ct`       |
//!
//! All generations use AES-256-GCM. New data is written as v2 (secret-based,
//! [`SymmetricCodec`]) or v3 (recipient-keyed, [`codec::hybrid`]); the
//! [`Migrator`] re-encrypts older envelopes as v3.
//!
//! Every operation is pure given its inputs and the OS CSPRNG: there is no
//! shared mutable state and no locking.

pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod migrate;
pub mod secret;
pub mod telemetry;
pub mod version;

pub use codec::hybrid::{
    generate_kem_keypair, generate_signature_keypair, hybrid_decrypt, hybrid_encrypt,
    sign_and_encrypt, verify_and_decrypt,
};
pub use codec::symmetric::SymmetricCodec;
pub use codec::{Envelope, SignedEnvelope};
pub use config::CryptoConfig;
pub use crypto::kdf::hash_data;
pub use crypto::{
    generate_secure_token, KemKeyPair, KemPublicKey, KemSecretKey, SignatureKeyPair, SigningKey,
    VerifyingKey, DEFAULT_TOKEN_BYTES,
};
pub use error::{CryptoError, CryptoResult};
pub use migrate::{Migrated, MigrationKey, MigrationState, Migrator};
pub use version::{
    detect_version, is_quantum_encrypted, needs_upgrade, probe_version, DetectionPolicy,
    EncryptionVersion,
};

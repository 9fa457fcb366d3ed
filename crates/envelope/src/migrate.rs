//! Re-encryption of older envelopes into the current generation.
//!
//! Migration is a read-then-write with no partial state: the old envelope is
//! decrypted, the plaintext is re-encrypted with the hybrid codec, and a result
//! is returned only if both steps succeed. The input is never modified, so the
//! caller still holds a valid old envelope whenever migration fails.

use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::codec::{hybrid, symmetric::SymmetricCodec, Envelope};
use crate::crypto::{KemPublicKey, KemSecretKey};
use crate::error::{CryptoError, CryptoResult};
use crate::version::{detect_version, needs_upgrade, DetectionPolicy, EncryptionVersion};

/// Key able to open the envelope being migrated.
#[derive(Debug, Clone, Copy)]
pub enum MigrationKey<'a> {
    /// Shared secret for v1/v2 envelopes.
    Secret(&'a str),
    /// Recipient KEM secret key for v3 envelopes (key rotation).
    Kem(&'a KemSecretKey),
}

/// Where an envelope stands relative to the current generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationState {
    /// The input matches no known layout.
    Unknown,
    /// Produced by an older generation.
    Stale(EncryptionVersion),
    /// Already at [`EncryptionVersion::CURRENT`].
    Current,
}

/// Result of a successful migration.
#[derive(Debug, Clone)]
pub struct Migrated {
    /// Generation the old envelope was detected as.
    pub previous: EncryptionVersion,
    /// Newly created v3 envelope.
    pub envelope: Envelope,
}

/// Orchestrates decrypt-with-old, re-encrypt-with-new.
#[derive(Debug, Clone, Default)]
pub struct Migrator {
    symmetric: SymmetricCodec,
    policy: DetectionPolicy,
}

impl Migrator {
    pub fn new(symmetric: SymmetricCodec, policy: DetectionPolicy) -> Self {
        Self { symmetric, policy }
    }

    /// Classify `text` without decrypting it.
    pub fn assess(&self, text: &str) -> MigrationState {
        match detect_version(text, &self.policy) {
            Err(_) => MigrationState::Unknown,
            Ok(version) if needs_upgrade(Some(version)) => MigrationState::Stale(version),
            Ok(_) => MigrationState::Current,
        }
    }

    /// Decode `text` and migrate it; see [`Migrator::migrate_envelope`].
    pub fn migrate(
        &self,
        text: &str,
        old_key: MigrationKey<'_>,
        new_recipient: &KemPublicKey,
    ) -> CryptoResult<Migrated> {
        let envelope = Envelope::decode(text, &self.policy)?;
        self.migrate_envelope(&envelope, old_key, new_recipient)
    }

    /// Re-encrypt `envelope` as v3 for `new_recipient`.
    ///
    /// v3 input is re-encrypted too, which is how KEM keys are rotated.
    ///
    /// # Errors
    ///
    /// Surfaces the original error from whichever phase failed; nothing is
    /// returned unless both phases succeed.
    pub fn migrate_envelope(
        &self,
        envelope: &Envelope,
        old_key: MigrationKey<'_>,
        new_recipient: &KemPublicKey,
    ) -> CryptoResult<Migrated> {
        let previous = envelope.version();
        debug!(from = %previous, "migration started");

        let plaintext = match self.open(envelope, old_key) {
            Ok(plaintext) => plaintext,
            Err(e) => {
                warn!(
                    from = %previous,
                    error = %e,
                    "migration aborted: old envelope did not decrypt"
                );
                return Err(e);
            }
        };

        let migrated = hybrid::hybrid_encrypt(&plaintext, new_recipient)?;
        info!(from = %previous, to = %migrated.version(), "envelope migrated");
        Ok(Migrated {
            previous,
            envelope: migrated,
        })
    }

    /// Migrate many envelopes independently; one failure never affects
    /// another.
    pub fn migrate_batch<'a, I>(
        &self,
        items: I,
        new_recipient: &KemPublicKey,
    ) -> Vec<CryptoResult<Migrated>>
    where
        I: IntoIterator<Item = (&'a str, MigrationKey<'a>)>,
    {
        let results: Vec<_> = items
            .into_iter()
            .map(|(text, key)| self.migrate(text, key, new_recipient))
            .collect();
        let failed = results.iter().filter(|r| r.is_err()).count();
        info!(total = results.len(), failed, "batch migration finished");
        results
    }

    fn open(
        &self,
        envelope: &Envelope,
        old_key: MigrationKey<'_>,
    ) -> CryptoResult<Zeroizing<String>> {
        let plaintext = match (envelope.version(), old_key) {
            (EncryptionVersion::Quantum, MigrationKey::Kem(secret)) => {
                hybrid::hybrid_decrypt(envelope, secret)?
            }
            // A v2 salt can begin with the v3 tag byte; envelopes written
            // before salts excluded it are retried as symmetric.
            (EncryptionVersion::Quantum, MigrationKey::Secret(secret)) => {
                debug!("secret supplied for a v3-shaped envelope, trying symmetric layouts");
                self.symmetric.decrypt_untagged(envelope, secret)?
            }
            (
                EncryptionVersion::Legacy | EncryptionVersion::Enhanced,
                MigrationKey::Secret(secret),
            ) => self.symmetric.decrypt(envelope, secret)?,
            (
                version @ (EncryptionVersion::Legacy | EncryptionVersion::Enhanced),
                MigrationKey::Kem(_),
            ) => {
                return Err(CryptoError::UnsupportedVersion(format!(
                    "{version} envelope needs a shared secret, not a KEM key"
                )));
            }
        };
        Ok(Zeroizing::new(plaintext))
    }
}

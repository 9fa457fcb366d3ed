//! Upgrade of gateway-held ciphertext.
//!
//! The stored version tag drives the same state machine as local migration:
//! current data is left alone, anything older (or untagged) is decrypted and
//! re-encrypted by the gateway. The plaintext only exists in a
//! [`zeroize::Zeroizing`] buffer between the two calls.

use envelope::{needs_upgrade, EncryptionVersion};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{GatewayResult, RemoteEncryptionError};
use crate::{MedicalGateway, RecordRef, RemoteCiphertext};

/// Outcome of [`migrate_remote`] and [`migrate_stored`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteMigration {
    /// Already at the current generation; nothing was sent.
    Current,
    /// Re-encrypted; persist the new ciphertext in place of the old one.
    Upgraded(RemoteCiphertext),
}

/// Bring a gateway ciphertext up to the current generation.
///
/// # Errors
///
/// Propagates gateway failures unchanged. Returns
/// [`RemoteEncryptionError::Downgrade`] if the gateway answers with an older
/// generation than the one it was given.
pub async fn migrate_remote<G>(
    gateway: &G,
    current: &RemoteCiphertext,
    record: &RecordRef,
    cancel: &CancellationToken,
) -> GatewayResult<RemoteMigration>
where
    G: MedicalGateway + ?Sized,
{
    upgrade(gateway, &current.ciphertext, Some(current.version), record, cancel).await
}

/// Like [`migrate_remote`], for a ciphertext read back from storage with its
/// persisted version tag. A missing or unrecognised tag is treated as stale.
pub async fn migrate_stored<G>(
    gateway: &G,
    ciphertext: &str,
    stored_version: Option<u8>,
    record: &RecordRef,
    cancel: &CancellationToken,
) -> GatewayResult<RemoteMigration>
where
    G: MedicalGateway + ?Sized,
{
    let previous = stored_version.and_then(|tag| EncryptionVersion::try_from(tag).ok());
    upgrade(gateway, ciphertext, previous, record, cancel).await
}

async fn upgrade<G>(
    gateway: &G,
    ciphertext: &str,
    previous: Option<EncryptionVersion>,
    record: &RecordRef,
    cancel: &CancellationToken,
) -> GatewayResult<RemoteMigration>
where
    G: MedicalGateway + ?Sized,
{
    if !needs_upgrade(previous) {
        debug!(table = record.table_name.as_deref(), "remote ciphertext already current");
        return Ok(RemoteMigration::Current);
    }

    let plaintext = gateway.decrypt_remote(ciphertext, record, cancel).await?;
    let upgraded = gateway.encrypt_remote(&plaintext, record, cancel).await?;
    drop(plaintext);

    if let Some(from) = previous {
        if upgraded.version < from {
            return Err(RemoteEncryptionError::Downgrade {
                from,
                to: upgraded.version,
            });
        }
    }

    info!(
        audit_id = %upgraded.audit_id,
        from = ?previous,
        to = %upgraded.version,
        "remote ciphertext upgraded"
    );
    Ok(RemoteMigration::Upgraded(upgraded))
}

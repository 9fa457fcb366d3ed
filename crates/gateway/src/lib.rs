//! Medical-data gateway adapter.
//!
//! Higher-sensitivity records are encrypted by a remote gateway that holds its
//! own key; the caller process never sees that key. This crate is the client
//! side of that boundary:
//!
//! - [`MedicalGateway`]: the contract. Every call takes a
//!   [`CancellationToken`], is bounded by a configured timeout, and fails with
//!   [`RemoteEncryptionError`], never with a local crypto error. It is not a
//!   drop-in replacement for [`envelope::SymmetricCodec`] or the hybrid codec.
//! - [`client::HttpGateway`]: the JSON-over-HTTP implementation.
//! - [`migrate::migrate_remote`] and [`migrate::migrate_stored`]: the upgrade
//!   state machine applied to gateway ciphertext.
//!
//! Audit identifiers in [`RecordRef`] are passed through unmodified, and each
//! operation carries a fresh correlation id for the remote audit log.

pub mod client;
pub mod config;
pub mod error;
pub mod migrate;

use async_trait::async_trait;
use envelope::EncryptionVersion;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use zeroize::Zeroizing;

pub use client::HttpGateway;
pub use config::GatewayConfig;
pub use error::{GatewayResult, RemoteEncryptionError};
pub use migrate::{migrate_remote, migrate_stored, RemoteMigration};

/// Audit identifiers attached to a remote operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordRef {
    pub record_id: Option<String>,
    pub table_name: Option<String>,
}

impl RecordRef {
    pub fn new(record_id: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            record_id: Some(record_id.into()),
            table_name: Some(table_name.into()),
        }
    }
}

/// Ciphertext produced by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCiphertext {
    /// Opaque ciphertext, to be persisted by the caller.
    pub ciphertext: String,
    /// Generation the gateway reported for it.
    pub version: EncryptionVersion,
    /// Correlation id of the operation that produced it.
    pub audit_id: Uuid,
}

/// Remote encryption behind a separate trust boundary.
#[async_trait]
pub trait MedicalGateway: Send + Sync {
    /// Encrypt `plaintext` with the gateway-held key.
    async fn encrypt_remote(
        &self,
        plaintext: &str,
        record: &RecordRef,
        cancel: &CancellationToken,
    ) -> GatewayResult<RemoteCiphertext>;

    /// Decrypt gateway ciphertext. The plaintext is zeroized on drop.
    async fn decrypt_remote(
        &self,
        ciphertext: &str,
        record: &RecordRef,
        cancel: &CancellationToken,
    ) -> GatewayResult<Zeroizing<String>>;
}

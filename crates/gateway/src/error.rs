//! Errors crossing the gateway trust boundary.

use common::UpstreamError;
use envelope::{CryptoError, EncryptionVersion};
use thiserror::Error;
use uuid::Uuid;

/// Failure of a remote encryption or decryption call.
///
/// Deliberately distinct from [`CryptoError`]: a caller can never mistake a
/// remote failure for a local one. Remote causes are opaque and are never
/// retried.
#[derive(Debug, Error)]
pub enum RemoteEncryptionError {
    /// The gateway answered with a non-2xx status.
    #[error("gateway rejected operation {audit_id} ({status}): {upstream}")]
    Remote {
        status: u16,
        upstream: UpstreamError,
        audit_id: Uuid,
    },

    /// The request never produced a response (connect, TLS, I/O).
    #[error("gateway transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The configured deadline elapsed before the gateway answered.
    #[error("gateway call {audit_id} timed out after {timeout_secs}s")]
    Timeout { audit_id: Uuid, timeout_secs: u64 },

    /// The caller cancelled the operation.
    #[error("gateway call {audit_id} cancelled")]
    Cancelled { audit_id: Uuid },

    /// A 2xx response body that does not follow the protocol.
    #[error("invalid gateway response: {0}")]
    InvalidResponse(String),

    /// A migration produced a ciphertext older than its input.
    #[error("gateway downgraded ciphertext from {from} to {to}")]
    Downgrade {
        from: EncryptionVersion,
        to: EncryptionVersion,
    },

    /// Local processing of a gateway result failed.
    #[error("local crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

pub type GatewayResult<T> = Result<T, RemoteEncryptionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_display_carries_audit_id_and_cause() {
        let audit_id = Uuid::new_v4();
        let e = RemoteEncryptionError::Remote {
            status: 503,
            upstream: UpstreamError::from_status(503, "kms throttled"),
            audit_id,
        };
        let msg = e.to_string();
        assert!(msg.contains(&audit_id.to_string()));
        assert!(msg.contains("kms throttled"));
    }

    #[test]
    fn downgrade_names_versions() {
        let e = RemoteEncryptionError::Downgrade {
            from: EncryptionVersion::Enhanced,
            to: EncryptionVersion::Legacy,
        };
        assert_eq!(e.to_string(), "gateway downgraded ciphertext from v2 to v1");
    }
}

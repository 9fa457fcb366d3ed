//! Request and response bodies exchanged with the medical-data gateway.
//!
//! The gateway holds its own key behind a separate trust boundary; these
//! bodies are the whole contract. Audit identifiers (`record_id`,
//! `table_name`) travel verbatim so the remote audit log can key on them.

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Header carrying the per-operation audit correlation id.
pub const AUDIT_CORRELATION_HEADER: &str = "X-Audit-Correlation-Id";

/// Path of the remote encrypt endpoint, relative to the gateway base URL.
pub const ENCRYPT_PATH: &str = "/encrypt";

/// Path of the remote decrypt endpoint, relative to the gateway base URL.
pub const DECRYPT_PATH: &str = "/decrypt";

// ---------------------------------------------------------------------------
// Encrypt endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /encrypt`. Wiped on drop.
#[derive(Debug, Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct EncryptRequest {
    /// Plaintext to protect.
    pub plaintext: String,
    /// Identifier of the record the value belongs to, for the audit log.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    /// Table the record lives in, for the audit log.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
}

/// Successful response body for `POST /encrypt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptResponse {
    /// Opaque ciphertext produced by the gateway.
    pub ciphertext: String,
    /// Numeric generation tag of the ciphertext (`1`, `2` or `3`).
    pub version: u8,
}

// ---------------------------------------------------------------------------
// Decrypt endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /decrypt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptRequest {
    /// Ciphertext previously returned by `POST /encrypt`.
    pub ciphertext: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
}

/// Successful response body for `POST /decrypt`.
#[derive(Clone, Serialize, Deserialize)]
pub struct DecryptResponse {
    /// Recovered plaintext.
    pub plaintext: String,
}

impl std::fmt::Debug for DecryptResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DecryptResponse([REDACTED])")
    }
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

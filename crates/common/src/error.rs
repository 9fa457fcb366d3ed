//! Classification of failures reported by the gateway's side of the boundary.

use thiserror::Error;

/// Upstream failure reported by the medical-data gateway.
///
/// The cause is opaque: only the status class and the message the gateway
/// chose to expose are kept. Variants map from HTTP status codes:
/// - [`UpstreamError::BadRequest`] ← 400, 422
/// - [`UpstreamError::Unauthorized`] ← 401, 403
/// - [`UpstreamError::NotFound`] ← 404
/// - [`UpstreamError::Unavailable`] ← 429, 503
/// - [`UpstreamError::Internal`] ← anything else
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// The gateway rejected the request as malformed.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The caller is not allowed to use the gateway key.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The record or key referenced by the request is unknown.
    #[error("not found: {0}")]
    NotFound(String),

    /// The gateway is temporarily unable to serve requests.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// Encryption or decryption failed on the remote side.
    #[error("internal error: {0}")]
    Internal(String),
}

impl UpstreamError {
    /// Classify a non-2xx HTTP status and its message.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 | 422 => UpstreamError::BadRequest(message),
            401 | 403 => UpstreamError::Unauthorized(message),
            404 => UpstreamError::NotFound(message),
            429 | 503 => UpstreamError::Unavailable(message),
            _ => UpstreamError::Internal(message),
        }
    }
}

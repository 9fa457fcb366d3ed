//! JSON-over-HTTP implementation of [`MedicalGateway`].
//!
//! Each call:
//! 1. Generates a fresh audit correlation id and sends it in
//!    [`AUDIT_CORRELATION_HEADER`].
//! 2. Races the request against the caller's [`CancellationToken`] and the
//!    configured deadline.
//! 3. Maps non-2xx responses to [`RemoteEncryptionError::Remote`] with an
//!    opaque [`UpstreamError`].
//!
//! There are no retries. A failed call is reported, never repeated with
//! different parameters.

use anyhow::Context;
use async_trait::async_trait;
use common::protocol::{
    DecryptRequest, DecryptResponse, EncryptRequest, EncryptResponse, ErrorResponse,
    AUDIT_CORRELATION_HEADER, DECRYPT_PATH, ENCRYPT_PATH,
};
use common::UpstreamError;
use envelope::EncryptionVersion;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn, Instrument};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::config::GatewayConfig;
use crate::error::{GatewayResult, RemoteEncryptionError};
use crate::{MedicalGateway, RecordRef, RemoteCiphertext};

/// HTTP client for the medical-data gateway.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    config: GatewayConfig,
}

impl HttpGateway {
    /// Build a client from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be constructed.
    pub fn new(config: GatewayConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("failed to build gateway HTTP client")?;
        Ok(Self { client, config })
    }

    async fn call<Req, Resp>(
        &self,
        path: &'static str,
        body: &Req,
        audit_id: Uuid,
        cancel: &CancellationToken,
    ) -> GatewayResult<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let timeout_secs = self.config.timeout_secs;
        let mut request = self
            .client
            .post(self.config.endpoint(path))
            .header(AUDIT_CORRELATION_HEADER, audit_id.to_string())
            .json(body);
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let exchange = async {
            let response = request.send().await.map_err(|e| {
                if e.is_timeout() {
                    RemoteEncryptionError::Timeout {
                        audit_id,
                        timeout_secs,
                    }
                } else {
                    RemoteEncryptionError::Transport(e)
                }
            })?;

            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ErrorResponse>(&text)
                    .map(|e| e.message)
                    .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown").to_owned());
                warn!(status = status.as_u16(), "gateway returned an error");
                return Err(RemoteEncryptionError::Remote {
                    status: status.as_u16(),
                    upstream: UpstreamError::from_status(status.as_u16(), message),
                    audit_id,
                });
            }

            response
                .json::<Resp>()
                .await
                .map_err(|e| RemoteEncryptionError::InvalidResponse(e.to_string()))
        };

        let span = tracing::info_span!("gateway_call", %audit_id, path);
        async {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("gateway call cancelled by caller");
                    Err(RemoteEncryptionError::Cancelled { audit_id })
                }
                result = tokio::time::timeout(self.config.timeout(), exchange) => match result {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        warn!(timeout_secs, "gateway call timed out");
                        Err(RemoteEncryptionError::Timeout { audit_id, timeout_secs })
                    }
                },
            }
        }
        .instrument(span)
        .await
    }
}

#[async_trait]
impl MedicalGateway for HttpGateway {
    async fn encrypt_remote(
        &self,
        plaintext: &str,
        record: &RecordRef,
        cancel: &CancellationToken,
    ) -> GatewayResult<RemoteCiphertext> {
        let audit_id = Uuid::new_v4();
        let body = EncryptRequest {
            plaintext: plaintext.to_owned(),
            record_id: record.record_id.clone(),
            table_name: record.table_name.clone(),
        };
        // `EncryptRequest` wipes its plaintext copy on drop, on every path.
        let resp: EncryptResponse = self.call(ENCRYPT_PATH, &body, audit_id, cancel).await?;

        let version = EncryptionVersion::try_from(resp.version).map_err(|_| {
            RemoteEncryptionError::InvalidResponse(format!("unknown version tag {}", resp.version))
        })?;
        debug!(
            %audit_id,
            %version,
            table = record.table_name.as_deref(),
            "remote encrypt complete"
        );
        Ok(RemoteCiphertext {
            ciphertext: resp.ciphertext,
            version,
            audit_id,
        })
    }

    async fn decrypt_remote(
        &self,
        ciphertext: &str,
        record: &RecordRef,
        cancel: &CancellationToken,
    ) -> GatewayResult<Zeroizing<String>> {
        let audit_id = Uuid::new_v4();
        let body = DecryptRequest {
            ciphertext: ciphertext.to_owned(),
            record_id: record.record_id.clone(),
            table_name: record.table_name.clone(),
        };
        let resp: DecryptResponse = self.call(DECRYPT_PATH, &body, audit_id, cancel).await?;
        debug!(%audit_id, table = record.table_name.as_deref(), "remote decrypt complete");
        Ok(Zeroizing::new(resp.plaintext))
    }
}

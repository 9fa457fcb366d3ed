//! Configuration loading and validation for the gateway adapter.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated gateway configuration, read from `GATEWAY_*` variables.
#[derive(Clone, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the gateway (e.g. `"https://crypto.internal"`). **Required.**
    pub base_url: String,

    /// Deadline for each remote call, in seconds. Every call has one.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Bearer token presented to the gateway, if it requires one.
    #[serde(default)]
    pub api_token: Option<String>,
}

fn default_timeout_secs() -> u64 {
    10
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl GatewayConfig {
    /// Configuration with defaults for everything but the base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: default_timeout_secs(),
            api_token: None,
        }
    }

    /// Load and validate configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::with_prefix("GATEWAY").try_parsing(true))
            .build()
            .context("failed to build gateway configuration")?;

        let c: GatewayConfig = cfg
            .try_deserialize()
            .context("failed to deserialise gateway configuration")?;

        c.validate()?;
        Ok(c)
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if url.is_empty() {
            anyhow::bail!("GATEWAY_BASE_URL is required and must not be empty");
        }
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            anyhow::bail!("GATEWAY_BASE_URL must be an http(s) URL");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("GATEWAY_TIMEOUT_SECS must be > 0");
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Join `path` onto the base URL without doubling the slash.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim().trim_end_matches('/'), path)
    }
}

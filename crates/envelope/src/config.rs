//! Configuration loading and validation for the envelope codecs.
//!
//! Values are read from `ENVELOPE_*` environment variables. Every field has a
//! default, so an empty environment yields a valid configuration.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::codec::symmetric::{SymmetricCodec, DEFAULT_KDF_ITERATIONS};
use crate::migrate::Migrator;
use crate::version::DetectionPolicy;

/// Lowest PBKDF2 iteration count accepted by [`CryptoConfig::validate`].
pub const MIN_KDF_ITERATIONS: u32 = 1_000;

/// Validated codec configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CryptoConfig {
    /// PBKDF2 iteration count for v2 envelopes. Must match the count that
    /// wrote any v2 data being read.
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Classify unrecognised input as v1 instead of rejecting it.
    #[serde(default)]
    pub legacy_fallback: bool,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_kdf_iterations() -> u32 {
    DEFAULT_KDF_ITERATIONS
}
fn default_log_level() -> String {
    "info".into()
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            kdf_iterations: default_kdf_iterations(),
            legacy_fallback: false,
            log_level: default_log_level(),
        }
    }
}

impl CryptoConfig {
    /// Load and validate configuration from `ENVELOPE_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::with_prefix("ENVELOPE").try_parsing(true))
            .build()
            .context("failed to build envelope configuration from environment")?;

        let c: CryptoConfig = cfg
            .try_deserialize()
            .context("failed to deserialise envelope configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    pub fn validate(&self) -> Result<()> {
        if self.kdf_iterations < MIN_KDF_ITERATIONS {
            anyhow::bail!(
                "ENVELOPE_KDF_ITERATIONS must be at least {MIN_KDF_ITERATIONS}, got {}",
                self.kdf_iterations
            );
        }
        if self.log_level.trim().is_empty() {
            anyhow::bail!("ENVELOPE_LOG_LEVEL must not be empty");
        }
        Ok(())
    }

    pub fn symmetric_codec(&self) -> SymmetricCodec {
        SymmetricCodec::with_iterations(self.kdf_iterations)
    }

    pub fn detection_policy(&self) -> DetectionPolicy {
        DetectionPolicy {
            legacy_fallback: self.legacy_fallback,
        }
    }

    pub fn migrator(&self) -> Migrator {
        Migrator::new(self.symmetric_codec(), self.detection_policy())
    }
}

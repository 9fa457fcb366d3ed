//! Envelope generations and version detection.
//!
//! # Detection order
//!
//! 1. **v3** carries an explicit leading tag byte (`3`) and a fixed minimum
//!    length. It is the only unambiguous signal, so it is checked first.
//! 2. **v2** has no tag; it is recognised structurally: long enough for
//!    `salt || iv || tag` with non-degenerate (not all-zero) salt and IV.
//! 3. **v1** has no tag and no salt; anything long enough for `iv || tag`.
//!
//! Input that matches none of these is rejected as
//! [`CryptoError::UnsupportedVersion`] unless [`DetectionPolicy::legacy_fallback`]
//! is set, which restores the historical "assume v1" behaviour. A v1 payload of
//! 44 bytes or more is indistinguishable from v2; the migrator compensates by
//! retrying v1 when a secret-keyed v2 decryption fails authentication.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::codec::{decode_base64, hybrid::V3_MIN_LEN, symmetric::SALT_LEN};
use crate::crypto::{IV_LEN, TAG_LEN};
use crate::error::{CryptoError, CryptoResult};

/// Minimum decoded length of a v1 envelope: `iv || tag`.
pub const V1_MIN_LEN: usize = IV_LEN + TAG_LEN;

/// Minimum decoded length of a v2 envelope: `salt || iv || tag`.
pub const V2_MIN_LEN: usize = SALT_LEN + IV_LEN + TAG_LEN;

/// Envelope generation. Values are never reused or renumbered; new
/// generations only append.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum EncryptionVersion {
    /// Unsalted SHA-256 key, `iv || ciphertext`.
    Legacy = 1,
    /// PBKDF2 key with per-message salt, `salt || iv || ciphertext`.
    Enhanced = 2,
    /// ML-KEM-768 hybrid, `3 || kem_ct || iv || ciphertext`.
    Quantum = 3,
}

impl EncryptionVersion {
    /// Generation produced by all new encryptions.
    pub const CURRENT: EncryptionVersion = EncryptionVersion::Quantum;

    /// Numeric tag of this generation.
    pub const fn tag(self) -> u8 {
        self as u8
    }
}

impl From<EncryptionVersion> for u8 {
    fn from(version: EncryptionVersion) -> u8 {
        version.tag()
    }
}

impl TryFrom<u8> for EncryptionVersion {
    type Error = CryptoError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            1 => Ok(EncryptionVersion::Legacy),
            2 => Ok(EncryptionVersion::Enhanced),
            3 => Ok(EncryptionVersion::Quantum),
            other => Err(CryptoError::UnsupportedVersion(format!("unknown version tag {other}"))),
        }
    }
}

impl fmt::Display for EncryptionVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.tag())
    }
}

/// `true` iff `version` is missing or older than [`EncryptionVersion::CURRENT`].
///
/// Missing metadata counts as stale: the failure mode is an unnecessary
/// re-encryption, never silent trust in an old scheme.
pub fn needs_upgrade(version: Option<EncryptionVersion>) -> bool {
    match version {
        None => true,
        Some(v) => v < EncryptionVersion::CURRENT,
    }
}

/// How to classify input that matches no known layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectionPolicy {
    /// Classify anything unrecognised (including undecodable text) as v1.
    pub legacy_fallback: bool,
}

impl DetectionPolicy {
    /// Reject unrecognised input.
    pub const STRICT: DetectionPolicy = DetectionPolicy {
        legacy_fallback: false,
    };
}

/// Determine which generation produced a base64 envelope.
///
/// # Errors
///
/// Under the strict policy, returns [`CryptoError::Decode`] for malformed base64
/// and [`CryptoError::UnsupportedVersion`] for input shorter than any layout.
pub fn detect_version(text: &str, policy: &DetectionPolicy) -> CryptoResult<EncryptionVersion> {
    match decode_base64(text) {
        Ok(bytes) => detect_bytes(&bytes, policy),
        Err(_) if policy.legacy_fallback => Ok(EncryptionVersion::Legacy),
        Err(e) => Err(e),
    }
}

/// Determine which generation produced an already-decoded envelope payload.
pub fn detect_bytes(bytes: &[u8], policy: &DetectionPolicy) -> CryptoResult<EncryptionVersion> {
    if has_quantum_layout(bytes) {
        return Ok(EncryptionVersion::Quantum);
    }
    if has_enhanced_layout(bytes) {
        return Ok(EncryptionVersion::Enhanced);
    }
    if bytes.len() >= V1_MIN_LEN || policy.legacy_fallback {
        return Ok(EncryptionVersion::Legacy);
    }
    Err(CryptoError::UnsupportedVersion(format!(
        "{} bytes match no known envelope layout",
        bytes.len()
    )))
}

/// Best-effort classification; never errors.
pub fn probe_version(text: &str, policy: &DetectionPolicy) -> Option<EncryptionVersion> {
    detect_version(text, policy).ok()
}

/// `true` if `text` decodes to a v3 envelope. Returns `false` on any decode
/// failure instead of erroring.
pub fn is_quantum_encrypted(text: &str) -> bool {
    decode_base64(text)
        .map(|bytes| has_quantum_layout(&bytes))
        .unwrap_or(false)
}

fn has_quantum_layout(bytes: &[u8]) -> bool {
    bytes.first() == Some(&EncryptionVersion::Quantum.tag()) && bytes.len() >= V3_MIN_LEN
}

fn has_enhanced_layout(bytes: &[u8]) -> bool {
    if bytes.len() < V2_MIN_LEN {
        return false;
    }
    let salt = &bytes[..SALT_LEN];
    let iv = &bytes[SALT_LEN..SALT_LEN + IV_LEN];
    !is_degenerate(salt) && !is_degenerate(iv)
}

fn is_degenerate(slice: &[u8]) -> bool {
    slice.iter().all(|&b| b == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    fn encoded(bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }

    #[test]
    fn versions_are_totally_ordered() {
        assert!(EncryptionVersion::Legacy < EncryptionVersion::Enhanced);
        assert!(EncryptionVersion::Enhanced < EncryptionVersion::Quantum);
        assert_eq!(EncryptionVersion::CURRENT, EncryptionVersion::Quantum);
    }

    #[test]
    fn tag_round_trip() {
        for v in [
            EncryptionVersion::Legacy,
            EncryptionVersion::Enhanced,
            EncryptionVersion::Quantum,
        ] {
            assert_eq!(EncryptionVersion::try_from(v.tag()).unwrap(), v);
        }
        assert!(matches!(
            EncryptionVersion::try_from(0),
            Err(CryptoError::UnsupportedVersion(_))
        ));
        assert!(EncryptionVersion::try_from(4).is_err());
    }

    #[test]
    fn serde_uses_numeric_tag() {
        assert_eq!(serde_json::to_string(&EncryptionVersion::Enhanced).unwrap(), "2");
        let v: EncryptionVersion = serde_json::from_str("3").unwrap();
        assert_eq!(v, EncryptionVersion::Quantum);
        assert!(serde_json::from_str::<EncryptionVersion>("9").is_err());
    }

    #[test]
    fn display_is_prefixed() {
        assert_eq!(EncryptionVersion::Legacy.to_string(), "v1");
    }

    #[test]
    fn needs_upgrade_rules() {
        assert!(needs_upgrade(None));
        assert!(needs_upgrade(Some(EncryptionVersion::Legacy)));
        assert!(needs_upgrade(Some(EncryptionVersion::Enhanced)));
        assert!(!needs_upgrade(Some(EncryptionVersion::Quantum)));
    }

    #[test]
    fn quantum_needs_tag_and_length() {
        let mut bytes = vec![0xAAu8; V3_MIN_LEN];
        bytes[0] = 3;
        assert_eq!(
            detect_bytes(&bytes, &DetectionPolicy::STRICT).unwrap(),
            EncryptionVersion::Quantum
        );
        // Tag byte alone on a short payload is not enough.
        let short = &bytes[..V2_MIN_LEN];
        assert_eq!(
            detect_bytes(short, &DetectionPolicy::STRICT).unwrap(),
            EncryptionVersion::Enhanced
        );
    }

    #[test]
    fn enhanced_requires_non_degenerate_salt_and_iv() {
        let mut bytes = vec![0x11u8; V2_MIN_LEN];
        assert_eq!(
            detect_bytes(&bytes, &DetectionPolicy::STRICT).unwrap(),
            EncryptionVersion::Enhanced
        );
        bytes[..SALT_LEN].fill(0);
        assert_eq!(
            detect_bytes(&bytes, &DetectionPolicy::STRICT).unwrap(),
            EncryptionVersion::Legacy
        );
        let mut bytes = vec![0x11u8; V2_MIN_LEN];
        bytes[SALT_LEN..SALT_LEN + IV_LEN].fill(0);
        assert_eq!(
            detect_bytes(&bytes, &DetectionPolicy::STRICT).unwrap(),
            EncryptionVersion::Legacy
        );
    }

    #[test]
    fn legacy_by_length() {
        let bytes = vec![0x22u8; V1_MIN_LEN];
        assert_eq!(
            detect_bytes(&bytes, &DetectionPolicy::STRICT).unwrap(),
            EncryptionVersion::Legacy
        );
    }

    #[test]
    fn strict_policy_rejects_short_input() {
        let text = encoded(&[1u8; V1_MIN_LEN - 1]);
        assert!(matches!(
            detect_version(&text, &DetectionPolicy::STRICT),
            Err(CryptoError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            detect_version("invalid-base64!@#", &DetectionPolicy::STRICT),
            Err(CryptoError::Decode(_))
        ));
        assert!(matches!(
            detect_version("", &DetectionPolicy::STRICT),
            Err(CryptoError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn legacy_fallback_accepts_anything() {
        let policy = DetectionPolicy {
            legacy_fallback: true,
        };
        assert_eq!(
            detect_version("invalid-base64!@#", &policy).unwrap(),
            EncryptionVersion::Legacy
        );
        assert_eq!(
            detect_version(&encoded(&[1u8; 4]), &policy).unwrap(),
            EncryptionVersion::Legacy
        );
    }

    #[test]
    fn probe_never_errors() {
        assert_eq!(probe_version("invalid-base64!@#", &DetectionPolicy::STRICT), None);
        assert_eq!(
            probe_version(&encoded(&[0x33u8; V2_MIN_LEN]), &DetectionPolicy::STRICT),
            Some(EncryptionVersion::Enhanced)
        );
    }

    #[test]
    fn is_quantum_encrypted_is_total() {
        assert!(!is_quantum_encrypted("invalid-base64!@#"));
        assert!(!is_quantum_encrypted(""));
        assert!(!is_quantum_encrypted(&encoded(&[3u8; 8])));
        let mut bytes = vec![0u8; V3_MIN_LEN];
        bytes[0] = 3;
        assert!(is_quantum_encrypted(&encoded(&bytes)));
    }
}

//! Envelope codecs.
//!
//! # Wire format
//!
//! Every envelope is standard-alphabet base64 text of one of these layouts:
//!
//! ```text
//! v1: iv(12) || ciphertext+tag
//! v2: salt(16) || iv(12) || ciphertext+tag
//! v3: 0x03 || ml-kem-768 ciphertext(1088) || iv(12) || ciphertext+tag
//! ```
//!
//! Only v3 carries an explicit tag; see [`crate::version`] for how v1 and v2
//! are told apart.

pub mod hybrid;
pub mod symmetric;

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CryptoError, CryptoResult};
use crate::version::{detect_bytes, DetectionPolicy, EncryptionVersion};

pub(crate) fn decode_base64(text: &str) -> CryptoResult<Vec<u8>> {
    STANDARD
        .decode(text.trim())
        .map_err(|e| CryptoError::Decode(format!("invalid base64: {e}")))
}

/// A self-describing ciphertext. Immutable once created.
#[derive(Clone, PartialEq, Eq)]
pub struct Envelope {
    version: EncryptionVersion,
    payload: Vec<u8>,
}

impl Envelope {
    pub(crate) fn new(version: EncryptionVersion, payload: Vec<u8>) -> Self {
        Self { version, payload }
    }

    /// Parse base64 text, classifying it with `policy`.
    ///
    /// v1 and v2 carry no tag, so a v1 payload long enough for the v2 layout
    /// comes back as Enhanced. [`SymmetricCodec::decrypt`] opens either.
    ///
    /// [`SymmetricCodec::decrypt`]: crate::SymmetricCodec::decrypt
    pub fn decode(text: &str, policy: &DetectionPolicy) -> CryptoResult<Self> {
        Self::from_bytes(decode_base64(text)?, policy)
    }

    /// Wrap an already-decoded payload, classifying it with `policy`.
    pub fn from_bytes(payload: Vec<u8>, policy: &DetectionPolicy) -> CryptoResult<Self> {
        let version = detect_bytes(&payload, policy)?;
        Ok(Self { version, payload })
    }

    /// Generation that produced this envelope.
    pub fn version(&self) -> EncryptionVersion {
        self.version
    }

    /// Raw binary layout (before base64).
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Standard base64 text form, the only representation that is persisted.
    pub fn encode(&self) -> String {
        STANDARD.encode(&self.payload)
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("version", &self.version)
            .field("len", &self.payload.len())
            .finish()
    }
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Envelope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Envelope::decode(&text, &DetectionPolicy::STRICT).map_err(serde::de::Error::custom)
    }
}

/// An envelope plus a detached signature over its ciphertext bytes.
///
/// The signature covers [`Envelope::payload`], never the plaintext, so anyone
/// holding the sender's verifying key can check authenticity without being
/// able to decrypt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedEnvelope {
    pub encrypted: Envelope,
    #[serde(with = "base64_bytes")]
    pub signature: Vec<u8>,
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::V2_MIN_LEN;

    #[test]
    fn decode_classifies_and_keeps_bytes() {
        let bytes = vec![0x5Au8; V2_MIN_LEN];
        let text = STANDARD.encode(&bytes);
        let envelope = Envelope::decode(&text, &DetectionPolicy::STRICT).unwrap();
        assert_eq!(envelope.version(), EncryptionVersion::Enhanced);
        assert_eq!(envelope.payload(), bytes.as_slice());
        assert_eq!(envelope.encode(), text);
        assert_eq!(envelope.to_string(), text);
    }

    #[test]
    fn decode_tolerates_surrounding_whitespace() {
        let text = format!("  {}\n", STANDARD.encode([0x5Au8; V2_MIN_LEN]));
        assert!(Envelope::decode(&text, &DetectionPolicy::STRICT).is_ok());
    }

    #[test]
    fn decode_rejects_bad_base64() {
        assert!(matches!(
            Envelope::decode("not base64 at all!", &DetectionPolicy::STRICT),
            Err(CryptoError::Decode(_))
        ));
    }

    #[test]
    fn debug_does_not_dump_payload() {
        let envelope = Envelope::new(EncryptionVersion::Enhanced, vec![0xEE; V2_MIN_LEN]);
        let rendered = format!("{envelope:?}");
        assert!(rendered.contains("Enhanced"));
        assert!(!rendered.contains("238"));
    }

    #[test]
    fn serde_as_base64_string() {
        let envelope = Envelope::new(EncryptionVersion::Enhanced, vec![0x5A; V2_MIN_LEN]);
        let json = serde_json::to_string(&envelope).unwrap();
        assert_eq!(json, format!("\"{}\"", envelope.encode()));
        let back: Envelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back, envelope);
    }

    #[test]
    fn signed_envelope_serde_round_trip() {
        let signed = SignedEnvelope {
            encrypted: Envelope::new(EncryptionVersion::Enhanced, vec![0x5A; V2_MIN_LEN]),
            signature: vec![1, 2, 3, 4],
        };
        let json = serde_json::to_value(&signed).unwrap();
        assert_eq!(json["signature"], "AQIDBA==");
        let back: SignedEnvelope = serde_json::from_value(json).unwrap();
        assert_eq!(back, signed);
    }
}

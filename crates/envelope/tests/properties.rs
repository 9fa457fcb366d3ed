//! End-to-end checks of the envelope contract through the public API.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use envelope::{
    detect_version, generate_kem_keypair, generate_secure_token, generate_signature_keypair,
    hash_data, hybrid_decrypt, hybrid_encrypt, is_quantum_encrypted, needs_upgrade,
    sign_and_encrypt, verify_and_decrypt, CryptoError, DetectionPolicy, EncryptionVersion,
    Envelope, MigrationKey, Migrator, SignedEnvelope, SymmetricCodec,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

fn codec() -> SymmetricCodec {
    SymmetricCodec::with_iterations(1_000)
}

#[test]
fn symmetric_and_hybrid_round_trips() {
    let c = codec();
    for plaintext in ["", "a", "ünïcødé ✓", "line\nbreaks\tand tabs"] {
        let v2 = c.encrypt(plaintext, "secret").unwrap();
        assert_eq!(c.decrypt(&v2, "secret").unwrap(), plaintext);

        let v1 = c.encrypt_legacy(plaintext, "secret").unwrap();
        assert_eq!(c.decrypt(&v1, "secret").unwrap(), plaintext);
    }

    let kp = generate_kem_keypair();
    let v3 = hybrid_encrypt("hybrid", &kp.public).unwrap();
    assert_eq!(hybrid_decrypt(&v3, &kp.secret).unwrap(), "hybrid");
}

#[test]
fn round_trip_through_persisted_text() {
    let c = codec();
    let text = c.encrypt("stored", "secret").unwrap().encode();
    let envelope = Envelope::decode(&text, &DetectionPolicy::STRICT).unwrap();
    assert_eq!(c.decrypt(&envelope, "secret").unwrap(), "stored");
}

#[test]
fn legacy_round_trip_through_persisted_text() {
    let c = codec();
    let long = "long ".repeat(100);
    for plaintext in ["short", "a legacy note of twenty+ bytes", long.as_str()] {
        let text = c.encrypt_legacy(plaintext, "secret").unwrap().encode();
        let envelope = Envelope::decode(&text, &DetectionPolicy::STRICT).unwrap();
        assert_eq!(c.decrypt(&envelope, "secret").unwrap(), plaintext);

        let relaxed = DetectionPolicy {
            legacy_fallback: true,
        };
        let envelope = Envelope::decode(&text, &relaxed).unwrap();
        assert_eq!(c.decrypt(&envelope, "secret").unwrap(), plaintext);

        let json = serde_json::to_string(&envelope).unwrap();
        let restored: Envelope = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.encode(), text);
        assert_eq!(c.decrypt(&restored, "secret").unwrap(), plaintext);
    }
}

#[test]
fn ciphertext_is_non_deterministic() {
    let c = codec();
    assert_ne!(
        c.encrypt("p", "s").unwrap().encode(),
        c.encrypt("p", "s").unwrap().encode()
    );
    let kp = generate_kem_keypair();
    assert_ne!(
        hybrid_encrypt("p", &kp.public).unwrap().encode(),
        hybrid_encrypt("p", &kp.public).unwrap().encode()
    );
}

#[test]
fn wrong_secret_never_yields_plaintext() {
    let c = codec();
    let envelope = c.encrypt("p", "s").unwrap();
    assert!(matches!(c.decrypt(&envelope, "s2"), Err(CryptoError::Authentication)));
}

#[test]
fn hybrid_output_detected_as_quantum() {
    let kp = generate_kem_keypair();
    let text = hybrid_encrypt("q", &kp.public).unwrap().encode();
    assert_eq!(
        detect_version(&text, &DetectionPolicy::STRICT).unwrap(),
        EncryptionVersion::Quantum
    );
    assert!(is_quantum_encrypted(&text));
    assert!(!is_quantum_encrypted("invalid-base64!@#"));
    assert!(!is_quantum_encrypted(&codec().encrypt("p", "s").unwrap().encode()));
}

#[test]
fn hash_determinism_and_sensitivity() {
    let h = |data: &str, salt: Option<&str>| hash_data(data, salt).unwrap();
    assert_eq!(h("test", None), h("test", None));
    assert_ne!(h("test", None), h("test2", None));
    assert_ne!(h("test", None), h("test", Some("salt")));
}

#[test]
fn token_shape() {
    let a = generate_secure_token(16);
    let b = generate_secure_token(16);
    assert_eq!(a.len(), 32);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(a, b);
}

#[test]
fn migration_v2_to_v3() {
    let c = codec();
    let migrator = Migrator::new(c, DetectionPolicy::STRICT);
    let kp = generate_kem_keypair();
    let original = c.encrypt("record body", "old-secret").unwrap();

    let migrated = migrator
        .migrate(&original.encode(), MigrationKey::Secret("old-secret"), &kp.public)
        .unwrap();

    assert_eq!(hybrid_decrypt(&migrated.envelope, &kp.secret).unwrap(), "record body");
    assert_eq!(
        detect_version(&migrated.envelope.encode(), &DetectionPolicy::STRICT).unwrap(),
        EncryptionVersion::Quantum
    );
    assert!(!needs_upgrade(Some(migrated.envelope.version())));
    assert_eq!(c.decrypt(&original, "old-secret").unwrap(), "record body");
}

#[test]
fn signature_tamper_detection_on_persisted_form() {
    let sender = generate_signature_keypair();
    let recipient = generate_kem_keypair();
    let signed = sign_and_encrypt("signed note", &sender.secret, &recipient.public).unwrap();

    let json = serde_json::to_string(&signed).unwrap();
    let restored: SignedEnvelope = serde_json::from_str(&json).unwrap();
    assert_eq!(
        verify_and_decrypt(&restored, &sender.public, &recipient.secret).unwrap(),
        "signed note"
    );

    let mut bytes = STANDARD.decode(restored.encrypted.encode()).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x80;
    let tampered = SignedEnvelope {
        encrypted: Envelope::from_bytes(bytes, &DetectionPolicy::STRICT).unwrap(),
        signature: restored.signature.clone(),
    };
    assert!(matches!(
        verify_and_decrypt(&tampered, &sender.public, &recipient.secret),
        Err(CryptoError::InvalidSignature)
    ));
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Visit {
    patient_id: u64,
    notes: Vec<String>,
    vitals: Vitals,
    follow_up: Option<String>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Vitals {
    temperature: f64,
    fasting: bool,
}

#[test]
fn json_structural_fidelity() {
    let c = codec();
    let value = json!({
        "array": [1, 2, 3, "test"],
        "nested": {"deep": [{"x": -1.25}, [true, false, null]]},
        "string": "value",
        "number": 42
    });
    let envelope = c.encrypt_json(&value, "k").unwrap();
    let back: serde_json::Value = c.decrypt_json(&envelope, "k").unwrap();
    assert_eq!(back, value);

    let visit = Visit {
        patient_id: 7,
        notes: vec!["stable".into(), "review in 2w".into()],
        vitals: Vitals {
            temperature: 36.6,
            fasting: true,
        },
        follow_up: None,
    };
    let envelope = c.encrypt_json(&visit, "k").unwrap();
    let back: Visit = c.decrypt_json(&envelope, "k").unwrap();
    assert_eq!(back, visit);
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn v2_always_round_trips(plaintext in ".*", secret in ".{1,32}") {
            let c = codec();
            let envelope = c.encrypt(&plaintext, &secret).unwrap();
            prop_assert_eq!(envelope.version(), EncryptionVersion::Enhanced);
            prop_assert_eq!(c.decrypt(&envelope, &secret).unwrap(), plaintext);
        }

        #[test]
        fn v2_never_detected_as_quantum(plaintext in ".{0,2048}") {
            let text = codec().encrypt(&plaintext, "s").unwrap().encode();
            prop_assert!(!is_quantum_encrypted(&text));
            prop_assert_eq!(
                detect_version(&text, &DetectionPolicy::STRICT).unwrap(),
                EncryptionVersion::Enhanced
            );
        }
    }
}

//! Structured logging setup.
//!
//! # Telemetry invariants
//!
//! - **No plaintext, secrets, key material or ciphertext bodies** may appear in
//!   any span attribute or log field. Versions, lengths and counts are fine.
//! - Log level comes from configuration; `RUST_LOG` overrides it.

pub mod init;

pub use init::init_telemetry;

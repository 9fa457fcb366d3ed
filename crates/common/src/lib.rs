//! Types shared between the envelope crates and the medical-data gateway.

pub mod error;
pub mod protocol;

pub use error::UpstreamError;

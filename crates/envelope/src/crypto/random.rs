//! Cryptographically secure randomness.
//!
//! Every salt, IV and token comes from the OS CSPRNG. `OsRng` is a stateless
//! handle, so concurrent callers never share generator state.

use aes_gcm::aead::{rand_core::RngCore, OsRng};

/// Default byte length for [`generate_secure_token`].
pub const DEFAULT_TOKEN_BYTES: usize = 32;

/// Return `N` random bytes.
pub fn random_array<const N: usize>() -> [u8; N] {
    let mut buf = [0u8; N];
    OsRng.fill_bytes(&mut buf);
    buf
}

/// Random token of `byte_len` bytes, hex-encoded (`2 * byte_len` characters).
pub fn generate_secure_token(byte_len: usize) -> String {
    let mut buf = vec![0u8; byte_len];
    OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}

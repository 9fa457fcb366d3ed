//! Zeroize-on-drop buffers for key material.
//!
//! Derived AEAD keys and decapsulated shared secrets are held in these types
//! for the shortest scope possible. Dropping them overwrites the memory.

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Fixed-size AEAD key that holds exactly [`KEY_LEN`] bytes.
///
/// When this type is dropped, the memory is overwritten with zeroes.
#[derive(Clone)]
pub struct AeadKey(Box<[u8; KEY_LEN]>);

impl Drop for AeadKey {
    fn drop(&mut self) {
        let bytes: &mut [u8; KEY_LEN] = &mut self.0;
        bytes.zeroize();
    }
}

impl AeadKey {
    /// Build a key from the first [`KEY_LEN`] bytes of `material`.
    ///
    /// Returns `None` if `material` is shorter than [`KEY_LEN`].
    pub(crate) fn from_prefix(material: &[u8]) -> Option<Self> {
        let prefix = material.get(..KEY_LEN)?;
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(prefix);
        Some(Self(buf))
    }

    pub(crate) fn from_array(bytes: [u8; KEY_LEN]) -> Self {
        let mut bytes = bytes;
        let key = Self(Box::new(bytes));
        bytes.zeroize();
        key
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for AeadKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material, not even in debug builds.
        f.write_str("AeadKey([REDACTED])")
    }
}

/// Variable-length secret buffer (KEM shared secrets, serialized secret keys).
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretBytes(Vec<u8>);

impl SecretBytes {
    /// Take ownership of `bytes`; they are zeroized when this value drops.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Borrow the secret bytes.
    pub fn expose(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&[u8]> for SecretBytes {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl std::fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretBytes([REDACTED; {}])", self.0.len())
    }
}

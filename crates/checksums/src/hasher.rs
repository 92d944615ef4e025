use std::fmt;

use digest::Digest;

use crate::FileDigest;

/// Length in bytes of a raw MD5 digest.
pub const DIGEST_LEN: usize = 16;

/// Streaming MD5 hasher fed with the bytes of one file body.
#[derive(Clone, Default)]
pub struct Md5 {
    inner: md5::Md5,
    consumed: u64,
}

impl Md5 {
    /// Creates a hasher with an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds additional bytes into the digest state.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
        self.consumed += data.len() as u64;
    }

    /// Number of bytes hashed so far.
    #[must_use]
    pub const fn bytes_hashed(&self) -> u64 {
        self.consumed
    }

    /// Finalises the digest and returns the raw 128-bit output.
    #[must_use]
    pub fn finalize(self) -> [u8; DIGEST_LEN] {
        self.inner.finalize().into()
    }

    /// Finalises the digest into its wire rendering.
    #[must_use]
    pub fn finish(self) -> FileDigest {
        FileDigest::from_bytes(self.finalize())
    }

    /// Computes the MD5 digest of `data` in one shot.
    #[must_use]
    pub fn digest(data: &[u8]) -> [u8; DIGEST_LEN] {
        let mut hasher = Self::new();
        hasher.update(data);
        hasher.finalize()
    }
}

impl fmt::Debug for Md5 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Md5")
            .field("consumed", &self.consumed)
            .finish_non_exhaustive()
    }
}

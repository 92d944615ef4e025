use std::fmt::{self, Write as _};
use std::io::{self, ErrorKind, Read};

use crate::hasher::{DIGEST_LEN, Md5};

/// Hexadecimal rendering of a finished file digest.
///
/// Locally computed digests use lowercase hex with leading zero digits
/// removed; an all-zero digest renders as `"0"`. Digests received from a peer
/// are stored verbatim.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct FileDigest(String);

impl FileDigest {
    /// Renders a raw digest.
    #[must_use]
    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        let mut full = String::with_capacity(DIGEST_LEN * 2);
        for byte in bytes {
            // Writing into a String cannot fail.
            let _ = write!(full, "{byte:02x}");
        }
        let trimmed = full.trim_start_matches('0');
        if trimmed.is_empty() {
            Self("0".to_owned())
        } else {
            Self(trimmed.to_owned())
        }
    }

    /// Wraps a digest token received from the peer.
    #[must_use]
    pub fn from_wire(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the rendered digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` when no digest text is present, which is how a closed
    /// connection shows up in the digest exchange.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FileDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<[u8]> for FileDigest {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// Hashes everything `reader` yields and returns the rendered digest.
pub fn digest_reader<R: Read>(mut reader: R) -> io::Result<FileDigest> {
    let mut hasher = Md5::new();
    let mut buffer = vec![0u8; 64 * 1024];
    loop {
        match reader.read(&mut buffer) {
            Ok(0) => return Ok(hasher.finish()),
            Ok(n) => hasher.update(&buffer[..n]),
            Err(error) if error.kind() == ErrorKind::Interrupted => {}
            Err(error) => return Err(error),
        }
    }
}

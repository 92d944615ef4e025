//! Digest rendering and streaming behaviour as seen by the transfer engine.

use std::fs;

use checksums::{FileDigest, Md5, digest_reader};
use proptest::prelude::*;

// ============================================================================
// RFC 1321 vectors in wire rendering
// ============================================================================

#[test]
fn rfc1321_vectors_render_without_leading_zeros() {
    let vectors: [(&[u8], &str); 4] = [
        (b"", "d41d8cd98f00b204e9800998ecf8427e"),
        (b"a", "cc175b9c0f1b6a831c399e269772661"),
        (b"abc", "900150983cd24fb0d6963f7d28e17f72"),
        (b"message digest", "f96b697d7cb7938d525a2f31aaf161d0"),
    ];
    for (input, expected) in vectors {
        assert_eq!(
            FileDigest::from_bytes(Md5::digest(input)).as_str(),
            expected,
            "input {:?}",
            String::from_utf8_lossy(input)
        );
    }
}

#[test]
fn digest_of_file_matches_in_memory_digest() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("payload.bin");
    let mut data = vec![0u8; 100_000];
    for (index, byte) in data.iter_mut().enumerate() {
        *byte = (index * 31 % 256) as u8;
    }
    data[50_000] = 0;
    fs::write(&path, &data).expect("write payload");

    let from_file = digest_reader(fs::File::open(&path).expect("open")).expect("digest file");
    assert_eq!(from_file, FileDigest::from_bytes(Md5::digest(&data)));
}

#[test]
fn empty_reader_yields_digest_of_nothing() {
    let digest = digest_reader(std::io::empty()).expect("digest");
    assert_eq!(digest.as_str(), "d41d8cd98f00b204e9800998ecf8427e");
}

proptest! {
    #[test]
    fn chunking_does_not_change_the_digest(
        data in proptest::collection::vec(any::<u8>(), 0..4096),
        chunk in 1usize..512,
    ) {
        let mut hasher = Md5::new();
        for piece in data.chunks(chunk) {
            hasher.update(piece);
        }
        prop_assert_eq!(hasher.finish(), FileDigest::from_bytes(Md5::digest(&data)));
    }

    #[test]
    fn rendering_never_starts_with_zero_unless_zero(bytes in any::<[u8; 16]>()) {
        let rendered = FileDigest::from_bytes(bytes);
        prop_assert!(rendered.as_str() == "0" || !rendered.as_str().starts_with('0'));
        prop_assert!(rendered.as_str().len() <= 32);
    }
}

#![deny(missing_docs)]

//! Digest helpers used while assembling Debian packages.
//!
//! Every payload file that ends up in a package gets an entry in the `md5sums` control file,
//! so the most common operation here is [`compute_md5_hex`]. The generic functions work with
//! any algorithm from [RustCrypto/hashes](https://github.com/RustCrypto/hashes) that
//! implements the [`Digest`] trait.
//!
//! # Examples
//!
//! ```no_run
//! use gendeb_digest::{compute_bytes_digest, compute_file_digest, compute_md5_hex, Sha256};
//!
//! // The line that would be written to `md5sums` for this content
//! assert_eq!(compute_md5_hex(b""), "d41d8cd98f00b204e9800998ecf8427e");
//!
//! // Compute the SHA256 hash of a file
//! let sha256_result = compute_file_digest::<Sha256>("somefile.deb").unwrap();
//! println!("SHA256 hash: {:x}", sha256_result);
//! ```
//!
//! # Available functions
//!
//! - [`compute_md5_hex`]: lowercase hex MD5 of a byte slice.
//! - [`compute_file_digest`]: Computes the hash of a file on disk.
//! - [`digest_to_hex`] / [`parse_digest_from_hex`]: convert a digest to and from its hex
//!   representation.
//! - [`HashingWriter`]: wraps a writer and hashes everything that passes through.

pub use digest;

use digest::{Digest, Output};
use std::{fs::File, io::Write, path::Path};

pub use md5::Md5;
pub use sha2::Sha256;

/// A type alias for the output of a SHA256 hash.
pub type Sha256Hash = sha2::digest::Output<Sha256>;

/// A type alias for the output of an MD5 hash.
pub type Md5Hash = md5::digest::Output<Md5>;

/// Compute a hash of the file at the specified location.
pub fn compute_file_digest<D: Digest + Default + Write>(
    path: impl AsRef<Path>,
) -> Result<Output<D>, std::io::Error> {
    let mut file = File::open(path)?;

    let mut hasher = D::default();
    std::io::copy(&mut file, &mut hasher)?;

    Ok(hasher.finalize())
}

/// Compute a hash of the specified bytes.
pub fn compute_bytes_digest<D: Digest + Default>(bytes: impl AsRef<[u8]>) -> Output<D> {
    let mut hasher = D::default();
    hasher.update(bytes);
    hasher.finalize()
}

/// Returns the MD5 digest of `bytes` as lowercase hexadecimal text, the format used by the
/// `md5sums` control file.
pub fn compute_md5_hex(bytes: impl AsRef<[u8]>) -> String {
    digest_to_hex::<Md5>(&compute_bytes_digest::<Md5>(bytes))
}

/// Formats a digest as lowercase hexadecimal text.
pub fn digest_to_hex<D: Digest>(digest: &Output<D>) -> String {
    hex::encode(digest)
}

/// Parses a hash hex string to a digest.
pub fn parse_digest_from_hex<D: Digest>(str: &str) -> Option<Output<D>> {
    let mut hash = <Output<D>>::default();
    match hex::decode_to_slice(str, &mut hash) {
        Ok(()) => Some(hash),
        Err(_) => None,
    }
}

/// A simple object that provides a [`Write`] implementation that also immediately hashes the bytes
/// written to it. Call [`HashingWriter::finalize`] to retrieve both the original `impl Write`
/// object as well as the hash.
pub struct HashingWriter<W, D: Digest> {
    writer: W,
    hasher: D,
}

impl<W, D: Digest + Default> HashingWriter<W, D> {
    /// Constructs a new instance from a writer and a new (empty) hasher.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            hasher: Default::default(),
        }
    }
}

impl<W, D: Digest> HashingWriter<W, D> {
    /// Consumes this instance and returns the original writer and the hash of all bytes written to
    /// this instance.
    pub fn finalize(self) -> (W, Output<D>) {
        (self.writer, self.hasher.finalize())
    }
}

impl<W: Write, D: Digest> Write for HashingWriter<W, D> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let bytes = self.writer.write(buf)?;
        self.hasher.update(&buf[..bytes]);
        Ok(bytes)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod test {
    use super::{HashingWriter, Md5};
    use rstest::rstest;
    use std::io::Write;

    #[rstest]
    #[case("", "d41d8cd98f00b204e9800998ecf8427e")]
    #[case("1234567890", "e807f1fcf82d132f9bb018ca6738a19f")]
    #[case("Hello, world!", "6cd3556deb0da54bca060b4c39479839")]
    fn test_compute_md5_hex(#[case] input: &str, #[case] expected_hash: &str) {
        assert_eq!(super::compute_md5_hex(input), expected_hash);
    }

    #[rstest]
    #[case(
        "1234567890",
        "c775e7b757ede630cd0aa1113bd102661ab38829ca52a6422ab782862f268646"
    )]
    #[case(
        "Hello, world!",
        "315f5bdb76d078c43b8ac0064e4a0164612b1fce77c869345bfc94c75894edd3"
    )]
    fn test_compute_file_sha256(#[case] input: &str, #[case] expected_hash: &str) {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("test");
        std::fs::write(&file_path, input).unwrap();
        let hash = super::compute_file_digest::<sha2::Sha256>(&file_path).unwrap();

        assert_eq!(format!("{hash:x}"), expected_hash);
    }

    #[test]
    fn test_hashing_writer_matches_bytes_digest() {
        let mut writer = HashingWriter::<_, Md5>::new(Vec::new());
        writer.write_all(b"1234").unwrap();
        writer.write_all(b"567890").unwrap();
        let (bytes, hash) = writer.finalize();
        assert_eq!(bytes, b"1234567890");
        assert_eq!(hash, super::compute_bytes_digest::<Md5>("1234567890"));
    }

    #[test]
    fn test_digest_to_hex_roundtrip() {
        let digest = super::compute_bytes_digest::<Md5>("Hello, world!");
        let hex = super::digest_to_hex::<Md5>(&digest);
        assert_eq!(hex, super::compute_md5_hex("Hello, world!"));
        assert_eq!(super::parse_digest_from_hex::<Md5>(&hex), Some(digest));
    }

    #[test]
    fn test_parse_digest_from_hex() {
        let parsed =
            super::parse_digest_from_hex::<Md5>("e807f1fcf82d132f9bb018ca6738a19f").unwrap();
        assert_eq!(parsed, super::compute_bytes_digest::<Md5>("1234567890"));
        assert!(super::parse_digest_from_hex::<Md5>("not-hex").is_none());
        assert!(super::parse_digest_from_hex::<Md5>("e807f1fc").is_none());
    }
}

//! The gzip layer around the control and data tar streams.

use flate2::{read::GzDecoder, write::GzEncoder, Compression, GzBuilder};
use gendeb_types::CompressionLevel;
use std::io::{Read, Write};

/// The "unknown" operating system marker in the gzip header.
const OS_UNKNOWN: u8 = 255;

/// Wraps `writer` in a gzip encoder. The gzip header carries no timestamp so identical input
/// always compresses to identical bytes.
///
/// The stream is only complete after [`GzEncoder::finish`] has been called.
pub fn compressing_writer<W: Write>(
    writer: W,
    compression_level: CompressionLevel,
) -> Result<GzEncoder<W>, std::io::Error> {
    Ok(GzBuilder::new()
        .mtime(0)
        .operating_system(OS_UNKNOWN)
        .write(writer, Compression::new(compression_level.to_gzip_level()?)))
}

/// Wraps `reader` in a gzip decoder.
pub fn decompressing_reader<R: Read>(reader: R) -> GzDecoder<R> {
    GzDecoder::new(reader)
}

#[cfg(test)]
mod test {
    use super::{compressing_writer, decompressing_reader};
    use gendeb_types::CompressionLevel;
    use rstest::rstest;
    use std::io::{Read, Write};

    #[rstest]
    #[case(CompressionLevel::Lowest)]
    #[case(CompressionLevel::Default)]
    #[case(CompressionLevel::Highest)]
    fn test_roundtrip(#[case] level: CompressionLevel) {
        let input = "Package: foo\n".repeat(100);
        let mut writer = compressing_writer(Vec::new(), level).unwrap();
        writer.write_all(input.as_bytes()).unwrap();
        let compressed = writer.finish().unwrap();

        // gzip magic, deflate, no mtime
        assert_eq!(&compressed[..3], &[0x1f, 0x8b, 0x08]);
        assert_eq!(&compressed[4..8], &[0, 0, 0, 0]);

        let mut output = String::new();
        decompressing_reader(compressed.as_slice())
            .read_to_string(&mut output)
            .unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_output_is_reproducible() {
        let compress = || {
            let mut writer = compressing_writer(Vec::new(), CompressionLevel::Default).unwrap();
            writer.write_all(b"the same bytes").unwrap();
            writer.finish().unwrap()
        };
        assert_eq!(compress(), compress());
    }

    #[test]
    fn test_invalid_level() {
        assert!(compressing_writer(Vec::new(), CompressionLevel::Numeric(12)).is_err());
    }
}

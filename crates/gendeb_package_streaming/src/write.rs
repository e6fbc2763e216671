//! Functionality for writing Debian binary packages
use std::io::Write;

use flate2::write::GzEncoder;
use gendeb_digest::{compute_bytes_digest, Md5};
use gendeb_types::package::{
    CONTROL_MEMBER, CONTROL_PATH, DATA_MEMBER, DEBIAN_BINARY, DEBIAN_BINARY_MEMBER, MD5SUMS_PATH,
};
use gendeb_types::{BuildConfig, CompressionLevel, ControlFile, Md5Sums, Specification};

use crate::ar::ArchiveBuilder;
use crate::compression::compressing_writer;
use crate::tar_stream::TarArchiver;
use crate::BuildError;

/// Mode of the members of the outer archive and of the files in the control archive.
const METADATA_MODE: u32 = 0o644;

/// Options that influence the bytes of the package but not its contents.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// The compression level to use for the inner gzip encoded archives
    pub compression_level: CompressionLevel,

    /// A timestamp to use for all archive entries (useful for reproducible builds). Entries
    /// get a zero timestamp if this is not set.
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
}

impl WriteOptions {
    /// The modification time of every archive entry. Archives cannot record times before the
    /// epoch.
    fn mtime(&self) -> Result<u64, BuildError> {
        match self.timestamp {
            None => Ok(0),
            Some(timestamp) => u64::try_from(timestamp.timestamp())
                .map_err(|_| BuildError::InvalidTimestamp(timestamp)),
        }
    }
}

impl From<&BuildConfig> for WriteOptions {
    fn from(config: &BuildConfig) -> Self {
        Self {
            compression_level: config.compression_level,
            timestamp: config.timestamp,
        }
    }
}

/// A tar stream on top of a gzip encoder that buffers in memory.
type CompressedTar = TarArchiver<GzEncoder<Vec<u8>>>;

fn open_compressed_tar(
    kind: &'static str,
    options: &WriteOptions,
) -> Result<CompressedTar, BuildError> {
    let mtime = options.mtime()?;
    let encoder = compressing_writer(Vec::new(), options.compression_level)
        .map_err(|err| BuildError::Compression(kind, err))?;
    Ok(TarArchiver::new(encoder, mtime))
}

/// Finishes the tar stream first and the gzip stream underneath it second.
fn finish_compressed_tar(
    kind: &'static str,
    archive: CompressedTar,
) -> Result<Vec<u8>, BuildError> {
    archive
        .finish()
        .map_err(|err| BuildError::StreamWrite(kind, err))?
        .finish()
        .map_err(|err| BuildError::Compression(kind, err))
}

/// Write a Debian binary package for `spec` to a writer.
///
/// The package is an `ar` archive with three members, in this order:
///
/// * `debian-binary` containing `2.0\n`
/// * `control.tar.gz` containing `./control` (rendered from the `Control` section) and
///   `./md5sums` (one line per payload file)
/// * `data.tar.gz` containing one entry per payload file at its destination path, in the
///   order of the specification
///
/// Both tar archives are assembled in memory before the outer archive is written, because the
/// size of a member has to be known before its header.
///
/// # Errors
///
/// This function fails if a required control field is missing, if a payload file cannot be
/// read or has an invalid mode, if the configured timestamp is before the epoch, or if the
/// writer returns an error. Nothing is written to
/// `writer` unless all payload files were processed.
pub fn write_deb_package<W: Write>(
    writer: W,
    spec: &Specification,
    options: &WriteOptions,
) -> Result<W, BuildError> {
    spec.validate()?;

    let control_file = ControlFile::from_specification(spec).to_string();
    let mut control_archive = open_compressed_tar("control", options)?;
    control_archive
        .write_entry(CONTROL_PATH, METADATA_MODE, 0, 0, control_file.as_bytes())
        .map_err(|err| BuildError::StreamWrite("control", err))?;

    let mut data_archive = open_compressed_tar("data", options)?;
    let mut md5sums = Md5Sums::default();
    for file in &spec.files {
        let content = std::fs::read(&file.name).map_err(|source| BuildError::FileRead {
            path: file.name.clone(),
            source,
        })?;
        let digest = compute_bytes_digest::<Md5>(&content);
        let mode = file.parse_mode().map_err(|source| BuildError::InvalidMode {
            dest: file.dest.clone(),
            mode: file.mode.clone(),
            source,
        })?;

        tracing::debug!(
            "adding {} as {} ({:o}, {} bytes)",
            file.name.display(),
            file.dest,
            mode,
            content.len()
        );
        data_archive
            .write_entry(&file.dest, mode, file.uid, file.gid, &content)
            .map_err(|err| BuildError::StreamWrite("data", err))?;
        md5sums.push(digest, file.dest.as_str());
    }

    // the manifest is only complete once every payload file has been archived
    control_archive
        .write_entry(
            MD5SUMS_PATH,
            METADATA_MODE,
            0,
            0,
            md5sums.to_string().as_bytes(),
        )
        .map_err(|err| BuildError::StreamWrite("control", err))?;

    let control_archive = finish_compressed_tar("control", control_archive)?;
    let data_archive = finish_compressed_tar("data", data_archive)?;

    let mut package =
        ArchiveBuilder::new(writer, options.mtime()?).map_err(BuildError::OutputWrite)?;
    package
        .append(DEBIAN_BINARY_MEMBER, METADATA_MODE, DEBIAN_BINARY)
        .map_err(BuildError::OutputWrite)?;
    package
        .append(CONTROL_MEMBER, METADATA_MODE, &control_archive)
        .map_err(BuildError::OutputWrite)?;
    package
        .append(DATA_MEMBER, METADATA_MODE, &data_archive)
        .map_err(BuildError::OutputWrite)?;

    package.into_inner().map_err(BuildError::OutputWrite)
}

#[cfg(test)]
mod test {
    use super::{write_deb_package, WriteOptions};
    use crate::BuildError;
    use assert_matches::assert_matches;
    use chrono::TimeZone;
    use gendeb_types::{FileEntry, ModeError, Specification};
    use std::path::Path;
    use std::str::FromStr;

    fn spec_with_file(name: &Path, mode: &str) -> Specification {
        let mut spec = Specification::from_str(
            r#"{ "Control": { "Package": "foo", "Version": "1.2", "Architecture": "amd64" } }"#,
        )
        .unwrap();
        spec.files.push(FileEntry {
            name: name.to_path_buf(),
            dest: String::from("/usr/bin/foo"),
            mode: mode.to_owned(),
            uid: 0,
            gid: 0,
        });
        spec
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let result = write_deb_package(
            Vec::new(),
            &spec_with_file(&missing, "0755"),
            &WriteOptions::default(),
        );
        assert_matches!(result, Err(BuildError::FileRead { path, .. }) if path == missing);
    }

    #[test]
    fn test_invalid_mode() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("foo");
        std::fs::write(&file, "#!/bin/sh\n").unwrap();
        let result = write_deb_package(
            Vec::new(),
            &spec_with_file(&file, "rwxr-xr-x"),
            &WriteOptions::default(),
        );
        assert_matches!(
            result,
            Err(BuildError::InvalidMode { dest, mode, .. }) if dest == "/usr/bin/foo" && mode == "rwxr-xr-x"
        );
    }

    #[test]
    fn test_mode_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("foo");
        std::fs::write(&file, "#!/bin/sh\n").unwrap();

        for mode in ["77777777", "1000000000", "10000"] {
            let result = write_deb_package(
                Vec::new(),
                &spec_with_file(&file, mode),
                &WriteOptions::default(),
            );
            assert_matches!(
                result,
                Err(BuildError::InvalidMode { mode: m, source: ModeError::OutOfRange(_), .. }) if m == mode
            );
        }

        assert!(write_deb_package(
            Vec::new(),
            &spec_with_file(&file, "7777"),
            &WriteOptions::default()
        )
        .is_ok());
    }

    #[test]
    fn test_timestamp_before_epoch() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("foo");
        std::fs::write(&file, "#!/bin/sh\n").unwrap();
        let options = WriteOptions {
            timestamp: Some(chrono::Utc.timestamp_opt(-86400, 0).unwrap()),
            ..WriteOptions::default()
        };

        let mut output = Vec::new();
        assert_matches!(
            write_deb_package(&mut output, &spec_with_file(&file, "0755"), &options),
            Err(BuildError::InvalidTimestamp(timestamp)) if timestamp.timestamp() == -86400
        );
        assert!(output.is_empty());
    }

    #[test]
    fn test_nothing_written_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut output = Vec::new();
        let result = write_deb_package(
            &mut output,
            &spec_with_file(&dir.path().join("missing"), "0755"),
            &WriteOptions::default(),
        );
        assert!(result.is_err());
        assert!(output.is_empty());
    }

    #[test]
    fn test_validates_control() {
        let mut spec = spec_with_file(Path::new("unused"), "0644");
        spec.control.shift_remove("Architecture");
        assert_matches!(
            write_deb_package(Vec::new(), &spec, &WriteOptions::default()),
            Err(BuildError::Spec(gendeb_types::SpecError::MissingControlKey(key))) if key == "Architecture"
        );
    }
}

//! Functions to build a package straight to a file on disk.

use crate::write::{write_deb_package, WriteOptions};
use crate::{BuildError, BuildResult};
use gendeb_digest::{HashingWriter, Md5, Sha256};
use gendeb_types::{BuildConfig, Specification};
use std::io::BufWriter;
use std::path::Path;
use tempfile::NamedTempFile;

/// Loads the specification named by `config`, applies its overrides and writes the package to
/// the configured (or derived) output path.
///
/// ```rust,no_run
/// use gendeb_package_streaming::fs::build_package;
/// use gendeb_types::BuildConfig;
/// let result = build_package(&BuildConfig::new("hello.json")).unwrap();
/// println!("wrote {}", result.path.display());
/// ```
pub fn build_package(config: &BuildConfig) -> Result<BuildResult, BuildError> {
    let spec = Specification::load(config)?;
    let output = config.output_path(&spec)?;
    write_package_file(&spec, &output, &WriteOptions::from(config))
}

/// Writes the package for `spec` to `output`.
///
/// The package is first written to a temporary file next to `output` which is only moved into
/// place once the whole package was written. If anything fails the temporary file is removed
/// and `output` is left untouched.
pub fn write_package_file(
    spec: &Specification,
    output: &Path,
    options: &WriteOptions,
) -> Result<BuildResult, BuildError> {
    let create_err = |source| BuildError::CreateOutput {
        path: output.to_path_buf(),
        source,
    };

    let directory = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let temp_file = NamedTempFile::new_in(directory).map_err(create_err)?;

    // Compute the hashes of the package while it is being written.
    let md5_writer = HashingWriter::<_, Md5>::new(BufWriter::new(temp_file));
    let sha256_writer = HashingWriter::<_, Sha256>::new(md5_writer);
    let sha256_writer = write_deb_package(sha256_writer, spec, options)?;

    let (md5_writer, sha256) = sha256_writer.finalize();
    let (buf_writer, md5) = md5_writer.finalize();
    let temp_file = buf_writer
        .into_inner()
        .map_err(|err| BuildError::OutputWrite(err.into_error()))?;
    temp_file
        .as_file()
        .sync_all()
        .map_err(BuildError::OutputWrite)?;
    let total_size = temp_file
        .as_file()
        .metadata()
        .map_err(BuildError::OutputWrite)?
        .len();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp_file
            .as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .map_err(BuildError::OutputWrite)?;
    }

    temp_file
        .persist(output)
        .map_err(|err| create_err(err.error))?;

    tracing::info!("wrote {} ({} bytes)", output.display(), total_size);

    Ok(BuildResult {
        path: output.to_path_buf(),
        sha256,
        md5,
        total_size,
    })
}

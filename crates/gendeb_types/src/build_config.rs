use crate::{CompressionLevel, DebArchiveIdentifier, SpecError, Specification};
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Everything the package builder needs to know besides the specification document itself.
///
/// This is usually constructed from command line arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Path of the specification document
    pub spec_path: PathBuf,

    /// Replaces the `Version` control field of the specification.
    pub version: Option<String>,

    /// Replaces the derived output file name.
    pub output: Option<PathBuf>,

    /// The gzip level used for `control.tar.gz` and `data.tar.gz`.
    pub compression_level: CompressionLevel,

    /// Modification time recorded for every archive entry. Entries get a zero mtime when this
    /// is not set.
    pub timestamp: Option<DateTime<Utc>>,
}

impl BuildConfig {
    /// A configuration for the given specification document without any overrides.
    pub fn new(spec_path: impl Into<PathBuf>) -> Self {
        Self {
            spec_path: spec_path.into(),
            version: None,
            output: None,
            compression_level: CompressionLevel::default(),
            timestamp: None,
        }
    }

    /// Returns where the package for `spec` is written: the output override if there is one,
    /// otherwise `<Package>_<Version>_<Architecture>.deb` in the current directory.
    pub fn output_path(&self, spec: &Specification) -> Result<PathBuf, SpecError> {
        match &self.output {
            Some(output) => Ok(output.clone()),
            None => Ok(PathBuf::from(
                DebArchiveIdentifier::from_specification(spec)?.to_file_name(),
            )),
        }
    }
}

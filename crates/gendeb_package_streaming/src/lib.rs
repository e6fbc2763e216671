#![deny(missing_docs)]

//! This crate provides the ability to assemble a Debian binary package (`.deb`) from a
//! [`Specification`](gendeb_types::Specification) and to stream the parts of an existing
//! package back out.
//!
//! A package is an `ar` archive with three members: `debian-binary`, `control.tar.gz` and
//! `data.tar.gz`. The [`ar`], [`tar_stream`] and [`compression`] modules implement the three
//! container layers, [`write`] stitches them together and [`fs`] writes the result to disk.

use gendeb_digest::{Md5Hash, Sha256Hash};
use gendeb_types::{ModeError, SpecError};
use std::path::PathBuf;

pub mod ar;
pub mod compression;
pub mod fs;
pub mod read;
pub mod tar_stream;
pub mod write;

/// An error that can occur when building a package archive.
#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    /// The specification could not be loaded or is incomplete.
    #[error(transparent)]
    Spec(#[from] SpecError),

    /// A payload file could not be read.
    #[error("failed to read '{}'", .path.display())]
    FileRead {
        /// The source path of the payload file
        path: PathBuf,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },

    /// The mode of a payload file is not an octal number or out of range.
    #[error("invalid mode '{mode}' for '{dest}'")]
    InvalidMode {
        /// The installed path of the payload file
        dest: String,
        /// The mode as written in the specification
        mode: String,
        /// The underlying error
        #[source]
        source: ModeError,
    },

    /// The configured timestamp cannot be stored in an archive header.
    #[error("timestamp {0} is before 1970-01-01")]
    InvalidTimestamp(chrono::DateTime<chrono::Utc>),

    /// Writing an entry to one of the tar streams failed.
    #[error("failed to write to the {0} archive")]
    StreamWrite(&'static str, #[source] std::io::Error),

    /// The gzip encoder could not be set up or flushed.
    #[error("failed to compress the {0} archive")]
    Compression(&'static str, #[source] std::io::Error),

    /// The outer package archive could not be written.
    #[error("failed to write the package archive")]
    OutputWrite(#[source] std::io::Error),

    /// The output file could not be created or moved into place.
    #[error("failed to create '{}'", .path.display())]
    CreateOutput {
        /// Where the package was supposed to be written
        path: PathBuf,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },
}

/// An error that can occur when reading a package archive.
#[derive(thiserror::Error, Debug)]
#[allow(missing_docs)]
pub enum ReadError {
    #[error("an io error occurred")]
    IoError(#[from] std::io::Error),

    #[error("not an ar archive")]
    InvalidMagic,

    #[error("malformed ar member header: {0}")]
    MalformedHeader(String),

    #[error("the package does not contain a '{0}' member")]
    MissingMember(String),
}

/// Result struct returned when a package was written to disk.
#[derive(Debug)]
pub struct BuildResult {
    /// Where the package was written.
    pub path: PathBuf,

    /// The SHA256 hash of the package archive.
    pub sha256: Sha256Hash,

    /// The Md5 hash of the package archive.
    pub md5: Md5Hash,

    /// The size of the package archive in bytes.
    pub total_size: u64,
}

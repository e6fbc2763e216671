#![deny(missing_docs)]
//! `gendeb-types` contains the data models used to describe a Debian binary package before it
//! is assembled: the specification document, the files that make up the `control.tar.gz`
//! member and the configuration record handed to the builder. The library itself doesnt
//! write any archives.

mod build_config;
mod compression_level;
pub mod package;

pub use build_config::BuildConfig;
pub use compression_level::CompressionLevel;
pub use package::{
    ControlFile, DebArchiveIdentifier, FileEntry, Md5Sums, Md5SumsEntry, ModeError, SpecError,
    Specification,
};

//! Contains models of the specification document and of the files that are found in the
//! `control.tar.gz` member of a Debian binary package.

mod archive_identifier;
mod control;
mod md5sums;
mod spec;

pub use {
    archive_identifier::DebArchiveIdentifier,
    control::ControlFile,
    md5sums::{Md5Sums, Md5SumsEntry},
    spec::{FileEntry, ModeError, SpecError, Specification, MAX_MODE, REQUIRED_CONTROL_KEYS},
};

/// The contents of the `debian-binary` member. Always the first member of a package.
pub const DEBIAN_BINARY: &[u8] = b"2.0\n";

/// Name of the member that holds the package format version.
pub const DEBIAN_BINARY_MEMBER: &str = "debian-binary";

/// Name of the member that holds the compressed control archive.
pub const CONTROL_MEMBER: &str = "control.tar.gz";

/// Name of the member that holds the compressed payload archive.
pub const DATA_MEMBER: &str = "data.tar.gz";

/// Path of the control file inside the control archive.
pub const CONTROL_PATH: &str = "./control";

/// Path of the digest manifest inside the control archive.
pub const MD5SUMS_PATH: &str = "./md5sums";

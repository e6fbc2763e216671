//! Functions that enable inspecting a Debian package for objects that implement the
//! [`std::io::Read`] trait.

use crate::ar::{ArchiveMember, ArchiveReader};
use crate::compression::decompressing_reader;
use crate::ReadError;
use flate2::read::GzDecoder;
use gendeb_types::package::{CONTROL_MEMBER, CONTROL_PATH, DATA_MEMBER, MD5SUMS_PATH};
use gendeb_types::{ControlFile, Md5Sums};
use std::io::{Cursor, Read};
use std::str::FromStr;

/// The files of the control archive that gendeb writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlArchive {
    /// The parsed `./control` file
    pub control: ControlFile,
    /// The parsed `./md5sums` file, empty when the package has none
    pub md5sums: Md5Sums,
}

/// Reads all members of a package in archive order.
pub fn read_deb_members(reader: impl Read) -> Result<Vec<ArchiveMember>, ReadError> {
    ArchiveReader::new(reader)?.collect()
}

/// Returns the contents of the member called `name`.
pub fn read_member(reader: impl Read, name: &str) -> Result<Vec<u8>, ReadError> {
    for member in ArchiveReader::new(reader)? {
        let member = member?;
        if member.header.name == name {
            return Ok(member.data);
        }
    }
    Err(ReadError::MissingMember(name.to_owned()))
}

/// Returns the `control.tar.gz` member as a decompressed `tar::Archive`.
pub fn stream_control(
    reader: impl Read,
) -> Result<tar::Archive<GzDecoder<Cursor<Vec<u8>>>>, ReadError> {
    stream_member(reader, CONTROL_MEMBER)
}

/// Returns the `data.tar.gz` member as a decompressed `tar::Archive`. The archive can be used to
/// unpack the payload or to perform introspection.
pub fn stream_data(
    reader: impl Read,
) -> Result<tar::Archive<GzDecoder<Cursor<Vec<u8>>>>, ReadError> {
    stream_member(reader, DATA_MEMBER)
}

fn stream_member(
    reader: impl Read,
    name: &str,
) -> Result<tar::Archive<GzDecoder<Cursor<Vec<u8>>>>, ReadError> {
    let data = read_member(reader, name)?;
    Ok(tar::Archive::new(decompressing_reader(Cursor::new(data))))
}

/// Reads and parses the `./control` and `./md5sums` files of a package.
pub fn read_control_archive(reader: impl Read) -> Result<ControlArchive, ReadError> {
    let mut control = None;
    let mut md5sums = Md5Sums::default();

    let mut archive = stream_control(reader)?;
    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        let mut contents = String::new();
        entry.read_to_string(&mut contents)?;

        match path.as_str() {
            CONTROL_PATH => control = Some(ControlFile::from_str(&contents)?),
            MD5SUMS_PATH => md5sums = Md5Sums::from_str(&contents)?,
            _ => tracing::debug!("skipping {} in the control archive", path),
        }
    }

    let control = control.ok_or_else(|| ReadError::MissingMember(CONTROL_PATH.to_owned()))?;
    Ok(ControlArchive { control, md5sums })
}

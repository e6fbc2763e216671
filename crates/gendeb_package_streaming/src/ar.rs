//! The `ar` container that holds the members of a Debian package.
//!
//! An archive starts with the global magic `!<arch>\n`. Every member follows as a 60 byte text
//! header and the raw member bytes, padded with a `\n` to an even offset.
//!
//! | field | width | format |
//! |-------|-------|--------|
//! | name  | 16    | text, space padded |
//! | mtime | 12    | decimal |
//! | uid   | 6     | decimal |
//! | gid   | 6     | decimal |
//! | mode  | 8     | octal |
//! | size  | 10    | decimal |
//! | magic | 2     | `` `\n `` |

use crate::ReadError;
use std::io::{self, Read, Write};

/// The global header of every `ar` archive.
pub const GLOBAL_MAGIC: &[u8; 8] = b"!<arch>\n";

/// The size of a member header.
pub const HEADER_LEN: usize = 60;

const HEADER_MAGIC: &[u8; 2] = b"`\n";
const PADDING: u8 = b'\n';

const NAME: (usize, usize) = (0, 16);
const MTIME: (usize, usize) = (16, 12);
const UID: (usize, usize) = (28, 6);
const GID: (usize, usize) = (34, 6);
const MODE: (usize, usize) = (40, 8);
const SIZE: (usize, usize) = (48, 10);

/// The metadata of a single archive member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberHeader {
    /// The name of the member, at most 16 bytes.
    pub name: String,
    /// Modification time in seconds since the epoch
    pub mtime: u64,
    /// Numeric owner id
    pub uid: u32,
    /// Numeric group id
    pub gid: u32,
    /// Permission bits
    pub mode: u32,
    /// Length of the member contents in bytes
    pub size: u64,
}

impl MemberHeader {
    /// A header for a member owned by root with the given name, mode and size.
    pub fn new(name: impl Into<String>, mode: u32, size: u64) -> Self {
        Self {
            name: name.into(),
            mtime: 0,
            uid: 0,
            gid: 0,
            mode,
            size,
        }
    }

    /// Encodes the header. Fails if a value does not fit its field.
    pub fn to_bytes(&self) -> io::Result<[u8; HEADER_LEN]> {
        let mut bytes = [b' '; HEADER_LEN];
        write_field(&mut bytes, NAME, "name", &self.name)?;
        write_field(&mut bytes, MTIME, "mtime", &self.mtime.to_string())?;
        write_field(&mut bytes, UID, "uid", &self.uid.to_string())?;
        write_field(&mut bytes, GID, "gid", &self.gid.to_string())?;
        write_field(&mut bytes, MODE, "mode", &format!("{:o}", self.mode))?;
        write_field(&mut bytes, SIZE, "size", &self.size.to_string())?;
        bytes[HEADER_LEN - 2..].copy_from_slice(HEADER_MAGIC);
        Ok(bytes)
    }

    /// Decodes a header.
    pub fn from_bytes(bytes: &[u8; HEADER_LEN]) -> Result<Self, ReadError> {
        if &bytes[HEADER_LEN - 2..] != HEADER_MAGIC {
            return Err(ReadError::MalformedHeader(String::from(
                "missing header terminator",
            )));
        }

        let name = read_field(bytes, NAME, "name")?;
        // GNU ar terminates names with a slash
        let name = name.strip_suffix('/').unwrap_or(name);

        Ok(Self {
            name: name.to_owned(),
            mtime: parse_field(bytes, MTIME, "mtime", 10)?,
            uid: parse_u32_field(bytes, UID, "uid", 10)?,
            gid: parse_u32_field(bytes, GID, "gid", 10)?,
            mode: parse_u32_field(bytes, MODE, "mode", 8)?,
            size: parse_field(bytes, SIZE, "size", 10)?,
        })
    }
}

fn write_field(
    bytes: &mut [u8; HEADER_LEN],
    (offset, width): (usize, usize),
    field: &str,
    value: &str,
) -> io::Result<()> {
    if value.len() > width {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("ar member {field} '{value}' does not fit in {width} bytes"),
        ));
    }
    bytes[offset..offset + value.len()].copy_from_slice(value.as_bytes());
    Ok(())
}

fn read_field<'a>(
    bytes: &'a [u8; HEADER_LEN],
    (offset, width): (usize, usize),
    field: &str,
) -> Result<&'a str, ReadError> {
    std::str::from_utf8(&bytes[offset..offset + width])
        .map(|value| value.trim_end_matches(' '))
        .map_err(|_| ReadError::MalformedHeader(format!("{field} is not valid utf-8")))
}

fn parse_field(
    bytes: &[u8; HEADER_LEN],
    range: (usize, usize),
    field: &str,
    radix: u32,
) -> Result<u64, ReadError> {
    let value = read_field(bytes, range, field)?;
    if value.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(value, radix)
        .map_err(|_| ReadError::MalformedHeader(format!("invalid {field} '{value}'")))
}

fn parse_u32_field(
    bytes: &[u8; HEADER_LEN],
    range: (usize, usize),
    field: &str,
    radix: u32,
) -> Result<u32, ReadError> {
    u32::try_from(parse_field(bytes, range, field, radix)?)
        .map_err(|_| ReadError::MalformedHeader(format!("{field} out of range")))
}

/// A member read from an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMember {
    /// The header of the member
    pub header: MemberHeader,
    /// The contents of the member
    pub data: Vec<u8>,
}

/// Writes members into an `ar` archive, strictly in the order they are appended.
#[derive(Debug)]
pub struct ArchiveBuilder<W: Write> {
    writer: W,
    mtime: u64,
}

impl<W: Write> ArchiveBuilder<W> {
    /// Writes the global magic and returns a builder that stamps every member with `mtime`.
    pub fn new(mut writer: W, mtime: u64) -> io::Result<Self> {
        writer.write_all(GLOBAL_MAGIC)?;
        Ok(Self { writer, mtime })
    }

    /// Appends a member. The size in the header is the length of `data`.
    pub fn append(&mut self, name: &str, mode: u32, data: &[u8]) -> io::Result<()> {
        let header = MemberHeader {
            mtime: self.mtime,
            ..MemberHeader::new(name, mode, data.len() as u64)
        };
        tracing::debug!("appending '{}' ({} bytes) to the package", name, data.len());
        self.writer.write_all(&header.to_bytes()?)?;
        self.writer.write_all(data)?;
        if data.len() % 2 == 1 {
            self.writer.write_all(&[PADDING])?;
        }
        Ok(())
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Reads the members of an `ar` archive one by one.
#[derive(Debug)]
pub struct ArchiveReader<R: Read> {
    reader: R,
}

impl<R: Read> ArchiveReader<R> {
    /// Checks the global magic and positions the reader at the first member.
    pub fn new(mut reader: R) -> Result<Self, ReadError> {
        let mut magic = [0u8; 8];
        match reader.read_exact(&mut magic) {
            Ok(()) if &magic == GLOBAL_MAGIC => Ok(Self { reader }),
            Ok(()) => Err(ReadError::InvalidMagic),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(ReadError::InvalidMagic),
            Err(e) => Err(e.into()),
        }
    }

    /// Reads the next member, or `None` at the end of the archive.
    pub fn next_member(&mut self) -> Result<Option<ArchiveMember>, ReadError> {
        let Some(header_bytes) = self.read_header()? else {
            return Ok(None);
        };
        let header = MemberHeader::from_bytes(&header_bytes)?;

        let mut data = Vec::new();
        (&mut self.reader).take(header.size).read_to_end(&mut data)?;
        if (data.len() as u64) < header.size {
            return Err(ReadError::MalformedHeader(format!(
                "member '{}' is truncated",
                header.name
            )));
        }

        if header.size % 2 == 1 {
            // the padding byte may be missing after the last member
            let mut padding = [0u8; 1];
            if self.reader.read(&mut padding)? == 1 && padding[0] != PADDING {
                return Err(ReadError::MalformedHeader(format!(
                    "invalid padding after member '{}'",
                    header.name
                )));
            }
        }

        Ok(Some(ArchiveMember { header, data }))
    }

    fn read_header(&mut self) -> Result<Option<[u8; HEADER_LEN]>, ReadError> {
        let mut bytes = [0u8; HEADER_LEN];
        let mut filled = 0;
        while filled < HEADER_LEN {
            match self.reader.read(&mut bytes[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        match filled {
            0 => Ok(None),
            HEADER_LEN => Ok(Some(bytes)),
            _ => Err(ReadError::MalformedHeader(String::from(
                "truncated member header",
            ))),
        }
    }
}

impl<R: Read> Iterator for ArchiveReader<R> {
    type Item = Result<ArchiveMember, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_member().transpose()
    }
}

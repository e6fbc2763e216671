//! Writing the `control` and `data` tar streams of a package.
//!
//! Entry names are stored exactly as given. `tar::Builder::append_data` would normalize
//! `./control` into `control` and refuse absolute paths like `/usr/bin/foo`, both of which a
//! Debian package needs, so the name field is filled in by hand and the header is appended
//! with [`tar::Builder::append`].

use std::io::{self, Write};
use tar::{EntryType, Header};

/// Width of the name field in a tar header.
const NAME_FIELD_LEN: usize = 100;

/// The largest mode the 8 byte octal mode field can hold.
const MAX_MODE: u32 = 0o7777777;

/// Name of the pseudo entry that carries a GNU long name.
const LONG_LINK_NAME: &[u8] = b"././@LongLink";

/// Serializes (header, content) pairs into a tar stream.
pub struct TarArchiver<W: Write> {
    builder: tar::Builder<W>,
    mtime: u64,
}

impl<W: Write> TarArchiver<W> {
    /// Starts a new tar stream on top of `writer`. Every entry gets `mtime` as its modification
    /// time.
    pub fn new(writer: W, mtime: u64) -> Self {
        Self {
            builder: tar::Builder::new(writer),
            mtime,
        }
    }

    /// Appends a regular file entry. The size recorded in the header is the length of
    /// `content`, which is padded to the next 512 byte boundary.
    ///
    /// Names that do not fit the 100 byte name field are preceded by a GNU long name entry.
    pub fn write_entry(
        &mut self,
        name: &str,
        mode: u32,
        uid: u64,
        gid: u64,
        content: &[u8],
    ) -> io::Result<()> {
        if name.as_bytes().contains(&0) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("entry name '{}' contains a nul byte", name.escape_debug()),
            ));
        }

        if mode > MAX_MODE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("mode {mode:o} of '{name}' does not fit in the tar header"),
            ));
        }

        if name.len() > NAME_FIELD_LEN {
            self.write_long_name(name)?;
        }

        let mut header = self.prepare_header(EntryType::Regular, mode, uid, gid, content.len());
        set_raw_name(&mut header, name.as_bytes());
        header.set_cksum();

        self.builder.append(&header, content)
    }

    /// Writes the end-of-archive marker and returns the inner writer.
    pub fn finish(self) -> io::Result<W> {
        self.builder.into_inner()
    }

    fn write_long_name(&mut self, name: &str) -> io::Result<()> {
        let mut data = Vec::with_capacity(name.len() + 1);
        data.extend_from_slice(name.as_bytes());
        data.push(0);

        let mut header = self.prepare_header(EntryType::GNULongName, 0o644, 0, 0, data.len());
        header.set_mtime(0);
        set_raw_name(&mut header, LONG_LINK_NAME);
        header.set_cksum();

        self.builder.append(&header, data.as_slice())
    }

    fn prepare_header(
        &self,
        entry_type: EntryType,
        mode: u32,
        uid: u64,
        gid: u64,
        size: usize,
    ) -> Header {
        let mut header = Header::new_gnu();
        header.set_entry_type(entry_type);
        header.set_mode(mode);
        header.set_uid(uid);
        header.set_gid(gid);
        header.set_size(size as u64);
        header.set_mtime(self.mtime);
        header
    }
}

/// Copies `name` into the name field, truncating it to the field width.
fn set_raw_name(header: &mut Header, name: &[u8]) {
    let field = &mut header.as_old_mut().name;
    let len = name.len().min(field.len());
    field.fill(0);
    field[..len].copy_from_slice(&name[..len]);
}

#[cfg(test)]
mod test {
    use super::TarArchiver;
    use std::io::Read;

    fn read_entries(bytes: &[u8]) -> Vec<(String, u32, u64, u64, u64, Vec<u8>)> {
        let mut archive = tar::Archive::new(bytes);
        archive
            .entries()
            .unwrap()
            .map(|entry| {
                let mut entry = entry.unwrap();
                let path = entry.path().unwrap().to_string_lossy().into_owned();
                let header = entry.header().clone();
                let mut content = Vec::new();
                entry.read_to_end(&mut content).unwrap();
                (
                    path,
                    header.mode().unwrap(),
                    header.uid().unwrap(),
                    header.gid().unwrap(),
                    header.mtime().unwrap(),
                    content,
                )
            })
            .collect()
    }

    #[test]
    fn test_names_are_stored_verbatim() {
        let mut archiver = TarArchiver::new(Vec::new(), 0);
        archiver
            .write_entry("./control", 0o644, 0, 0, b"Package: foo\n")
            .unwrap();
        archiver
            .write_entry("/usr/bin/foo", 0o755, 1000, 100, b"#!/bin/sh\n")
            .unwrap();
        let bytes = archiver.finish().unwrap();

        // the name field is not normalized
        assert_eq!(&bytes[..10], b"./control\0");

        assert_eq!(
            read_entries(&bytes),
            vec![
                (
                    String::from("./control"),
                    0o644,
                    0,
                    0,
                    0,
                    b"Package: foo\n".to_vec()
                ),
                (
                    String::from("/usr/bin/foo"),
                    0o755,
                    1000,
                    100,
                    0,
                    b"#!/bin/sh\n".to_vec()
                ),
            ]
        );
    }

    #[test]
    fn test_block_layout() {
        let mut archiver = TarArchiver::new(Vec::new(), 0);
        archiver.write_entry("./empty", 0o644, 0, 0, b"").unwrap();
        archiver
            .write_entry("./one-block", 0o644, 0, 0, &[b'x'; 512])
            .unwrap();
        archiver
            .write_entry("./partial", 0o644, 0, 0, &[b'y'; 513])
            .unwrap();
        let bytes = archiver.finish().unwrap();

        // headers + content padded to whole blocks + two zero blocks
        assert_eq!(bytes.len(), 512 + (512 + 512) + (512 + 1024) + 1024);
        assert!(bytes[bytes.len() - 1024..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_long_names() {
        let name = format!("/usr/share/doc/{}/changelog", "a".repeat(120));
        let mut archiver = TarArchiver::new(Vec::new(), 0);
        archiver.write_entry(&name, 0o644, 0, 0, b"log").unwrap();
        let bytes = archiver.finish().unwrap();

        assert_eq!(&bytes[..13], b"././@LongLink");
        let entries = read_entries(&bytes);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, name);
        assert_eq!(entries[0].5, b"log");
    }

    #[test]
    fn test_mtime() {
        let mut archiver = TarArchiver::new(Vec::new(), 1_700_000_000);
        archiver.write_entry("./control", 0o644, 0, 0, b"").unwrap();
        let bytes = archiver.finish().unwrap();
        assert_eq!(read_entries(&bytes)[0].4, 1_700_000_000);
    }

    #[test]
    fn test_oversized_mode_is_rejected() {
        let mut archiver = TarArchiver::new(Vec::new(), 0);
        archiver
            .write_entry("/usr/bin/foo", 0o7777777, 0, 0, b"")
            .unwrap();
        let err = archiver
            .write_entry("/usr/bin/bar", 0o77777777, 0, 0, b"")
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_nul_in_name_is_rejected() {
        let mut archiver = TarArchiver::new(Vec::new(), 0);
        let err = archiver
            .write_entry("./bad\0name", 0o644, 0, 0, b"")
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }
}

use gendeb_digest::{digest_to_hex, parse_digest_from_hex, Md5, Md5Hash};
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

/// Representation of the `md5sums` file in the control archive of a Debian package.
///
/// Contains one line per payload file: the lowercase hex MD5 of its contents, two spaces and the
/// path the file is installed to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Md5Sums {
    /// The entries, in archive order.
    pub entries: Vec<Md5SumsEntry>,
}

/// A single line of an [`Md5Sums`] file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Md5SumsEntry {
    /// The digest of the file contents
    pub digest: Md5Hash,
    /// The installed path of the file
    pub path: String,
}

impl Md5Sums {
    /// Appends an entry to the manifest.
    pub fn push(&mut self, digest: Md5Hash, path: impl Into<String>) {
        self.entries.push(Md5SumsEntry {
            digest,
            path: path.into(),
        });
    }

    /// Returns the digest recorded for `path`
    pub fn digest_of(&self, path: &str) -> Option<&Md5Hash> {
        self.entries
            .iter()
            .find(|entry| entry.path == path)
            .map(|entry| &entry.digest)
    }
}

impl Display for Md5Sums {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{}  {}", digest_to_hex::<Md5>(&entry.digest), entry.path)?;
        }
        Ok(())
    }
}

impl FromStr for Md5Sums {
    type Err = std::io::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |line: &str| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("invalid md5sums line '{line}'"),
            )
        };

        let entries = s
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| {
                let (digest, path) = line.split_once("  ").ok_or_else(|| invalid(line))?;
                let digest = parse_digest_from_hex::<Md5>(digest).ok_or_else(|| invalid(line))?;
                Ok(Md5SumsEntry {
                    digest,
                    path: path.to_owned(),
                })
            })
            .collect::<Result<_, Self::Err>>()?;
        Ok(Self { entries })
    }
}

#[cfg(test)]
mod test {
    use super::Md5Sums;
    use gendeb_digest::{compute_bytes_digest, Md5};
    use std::str::FromStr;

    #[test]
    fn test_render_md5sums() {
        let mut md5sums = Md5Sums::default();
        md5sums.push(compute_bytes_digest::<Md5>(""), "/usr/share/doc/foo/empty");
        md5sums.push(compute_bytes_digest::<Md5>("1234567890"), "/usr/bin/foo");

        insta::assert_snapshot!(md5sums.to_string(), @r###"
        d41d8cd98f00b204e9800998ecf8427e  /usr/share/doc/foo/empty
        e807f1fcf82d132f9bb018ca6738a19f  /usr/bin/foo
        "###);
    }

    #[test]
    fn test_parse_md5sums() {
        let md5sums = Md5Sums::from_str(
            "d41d8cd98f00b204e9800998ecf8427e  /opt/with two  spaces\ne807f1fcf82d132f9bb018ca6738a19f  /usr/bin/foo\n",
        )
        .unwrap();
        assert_eq!(md5sums.entries.len(), 2);
        assert_eq!(md5sums.entries[0].path, "/opt/with two  spaces");
        assert_eq!(
            md5sums.digest_of("/usr/bin/foo"),
            Some(&compute_bytes_digest::<Md5>("1234567890"))
        );
        assert_eq!(md5sums.digest_of("/missing"), None);

        assert!(Md5Sums::from_str("d41d8cd98f00b204e9800998ecf8427e /single/space").is_err());
        assert!(Md5Sums::from_str("zzzz  /bad/digest").is_err());
    }
}

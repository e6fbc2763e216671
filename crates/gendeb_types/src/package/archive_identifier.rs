use super::{SpecError, Specification};
use itertools::Itertools;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// The file extension of a Debian binary package.
const DEB_EXTENSION: &str = ".deb";

/// A Debian package archive identifier contains the `name`, `version` and `architecture` of a
/// package. This information is what makes up the conventional file name of a package and can
/// be derived back from it with [`DebArchiveIdentifier::try_from_filename`].
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct DebArchiveIdentifier {
    /// The name of the package.
    pub name: String,
    /// The version of the package.
    pub version: String,
    /// The architecture of the package.
    pub architecture: String,
}

impl DebArchiveIdentifier {
    /// Reads the identifying control fields from a specification.
    pub fn from_specification(spec: &Specification) -> Result<Self, SpecError> {
        let field = |key: &str| {
            spec.control_field(key)
                .map(str::to_owned)
                .ok_or_else(|| SpecError::MissingControlKey(key.to_owned()))
        };
        Ok(Self {
            name: field("Package")?,
            version: field("Version")?,
            architecture: field("Architecture")?,
        })
    }

    /// Converts the archive identifier into a filename, `<name>_<version>_<architecture>.deb`.
    pub fn to_file_name(&self) -> String {
        self.to_string()
    }

    /// Tries to convert the specified filename into a [`DebArchiveIdentifier`].
    pub fn try_from_filename(filename: &str) -> Option<Self> {
        let filename_without_ext = filename.strip_suffix(DEB_EXTENSION)?;

        // Filename is in the form of: <name>_<version>_<architecture>
        let (name, version, architecture) = filename_without_ext.splitn(3, '_').next_tuple()?;
        if architecture.contains('_') {
            return None;
        }

        Some(Self {
            name: name.to_owned(),
            version: version.to_owned(),
            architecture: architecture.to_owned(),
        })
    }

    /// Tries to convert the file name of the specified path into a [`DebArchiveIdentifier`].
    pub fn try_from_path(path: impl AsRef<Path>) -> Option<Self> {
        Self::try_from_filename(path.as_ref().file_name()?.to_str()?)
    }
}

impl Display for DebArchiveIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}_{}_{}{}",
            &self.name, &self.version, &self.architecture, DEB_EXTENSION
        )
    }
}

use crate::BuildConfig;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::{
    ffi::OsStr,
    fs::File,
    io::Read,
    num::ParseIntError,
    path::{Path, PathBuf},
    str::FromStr,
};

/// Control keys that every specification has to define.
pub const REQUIRED_CONTROL_KEYS: [&str; 3] = ["Package", "Version", "Architecture"];

/// The largest permission value a payload file can have (permission, setuid, setgid and sticky
/// bits).
pub const MAX_MODE: u32 = 0o7777;

/// An error that can occur when parsing the mode of a [`FileEntry`].
#[derive(Debug, thiserror::Error)]
pub enum ModeError {
    /// The mode is not an octal number.
    #[error("not an octal number")]
    Parse(#[from] ParseIntError),

    /// The mode has bits set above [`MAX_MODE`].
    #[error("{0:o} is larger than {MAX_MODE:o}")]
    OutOfRange(u32),
}

/// An error that can occur while loading a [`Specification`].
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    /// The specification document could not be read.
    #[error("failed to read '{}'", .path.display())]
    Io {
        /// The path of the document
        path: PathBuf,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON or does not have the expected shape.
    #[error("malformed specification document")]
    ParseJson(#[from] serde_json::Error),

    /// The document is not valid YAML or does not have the expected shape.
    #[error("malformed specification document")]
    ParseYaml(#[from] serde_yaml::Error),

    /// One of the [`REQUIRED_CONTROL_KEYS`] is absent.
    #[error("missing required control key: {0}")]
    MissingControlKey(String),
}

/// The document that describes a package: its control metadata and the files that make up its
/// payload.
///
/// ```json
/// {
///   "Control": { "Package": "hello", "Version": "1.0", "Architecture": "amd64" },
///   "Files": [ { "Name": "build/hello", "Dest": "/usr/bin/hello", "Mode": "0755" } ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Specification {
    /// The fields of the `control` file. Rendered in the order of the document.
    pub control: IndexMap<String, String>,

    /// The payload of the package, in the order it is archived.
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

/// A single payload file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileEntry {
    /// Where to read the file from on the building machine.
    pub name: PathBuf,

    /// The absolute path of the file once the package is installed.
    pub dest: String,

    /// Permission bits as an octal string, e.g. `"0755"`.
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Numeric id of the owning user
    #[serde(default)]
    pub uid: u64,

    /// Numeric id of the owning group
    #[serde(default)]
    pub gid: u64,
}

fn default_mode() -> String {
    String::from("0644")
}

impl FileEntry {
    /// Parses [`Self::mode`] as a base-8 integer of at most [`MAX_MODE`].
    pub fn parse_mode(&self) -> Result<u32, ModeError> {
        let mode = u32::from_str_radix(&self.mode, 8)?;
        if mode > MAX_MODE {
            return Err(ModeError::OutOfRange(mode));
        }
        Ok(mode)
    }
}

impl Specification {
    /// Loads the specification named by the configuration, applies its overrides and validates
    /// the result.
    pub fn load(config: &BuildConfig) -> Result<Self, SpecError> {
        let mut spec = Self::from_path(&config.spec_path)?;
        spec.apply_overrides(config);
        spec.validate()?;
        Ok(spec)
    }

    /// Parses a specification from a file. Files with a `.yaml` or `.yml` extension are parsed
    /// as YAML, everything else as JSON.
    pub fn from_path(path: &Path) -> Result<Self, SpecError> {
        let io_err = |source| SpecError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut contents = String::new();
        File::open(path)
            .and_then(|mut file| file.read_to_string(&mut contents))
            .map_err(io_err)?;

        match path.extension().and_then(OsStr::to_str) {
            Some("yaml" | "yml") => Self::from_yaml_str(&contents),
            _ => Self::from_str(&contents),
        }
    }

    /// Parses a specification from a YAML document.
    pub fn from_yaml_str(str: &str) -> Result<Self, SpecError> {
        serde_yaml::from_str(str).map_err(Into::into)
    }

    /// Replaces the `Version` control field if the configuration carries a version override.
    pub fn apply_overrides(&mut self, config: &BuildConfig) {
        if let Some(version) = &config.version {
            self.control
                .insert(String::from("Version"), version.clone());
        }
    }

    /// Checks that all [`REQUIRED_CONTROL_KEYS`] are present.
    pub fn validate(&self) -> Result<(), SpecError> {
        match REQUIRED_CONTROL_KEYS
            .iter()
            .find(|key| !self.control.contains_key(**key))
        {
            Some(key) => Err(SpecError::MissingControlKey((*key).to_owned())),
            None => Ok(()),
        }
    }

    /// Returns the value of a control field
    pub fn control_field(&self, key: &str) -> Option<&str> {
        self.control.get(key).map(String::as_str)
    }
}

impl FromStr for Specification {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map_err(Into::into)
    }
}

use super::Specification;
use indexmap::IndexMap;
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

/// Representation of the `control` file of a Debian binary package.
///
/// Every field is rendered as a single `key: value` line in insertion order. Keys and values
/// are written verbatim; a value that contains a newline will produce a broken control file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlFile {
    /// The fields of the control file.
    pub fields: IndexMap<String, String>,
}

impl ControlFile {
    /// Constructs the control file from the `Control` section of a specification.
    pub fn from_specification(spec: &Specification) -> Self {
        Self {
            fields: spec.control.clone(),
        }
    }

    /// Returns the value of a field
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}

impl Display for ControlFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (key, value) in &self.fields {
            writeln!(f, "{key}: {value}")?;
        }
        Ok(())
    }
}

impl FromStr for ControlFile {
    type Err = std::io::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = s
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| {
                line.split_once(':')
                    .map(|(key, value)| (key.to_owned(), value.trim_start().to_owned()))
                    .ok_or_else(|| {
                        std::io::Error::new(
                            std::io::ErrorKind::InvalidData,
                            format!("invalid control line '{line}'"),
                        )
                    })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { fields })
    }
}

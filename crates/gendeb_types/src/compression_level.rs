//! This module defines the `CompressionLevel` enum, which is used to specify
//! the gzip compression level for the archives inside a Debian package.

/// Select the compression level to use for the package
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionLevel {
    /// Use the lowest compression level (gzip: 1)
    Lowest,
    /// Use the highest compression level (gzip: 9)
    Highest,
    /// Use the default compression level (gzip: 6)
    #[default]
    Default,
    /// Use a numeric compression level (gzip: 1-9)
    Numeric(u32),
}

impl CompressionLevel {
    /// convert the compression level to a gzip compression level
    pub fn to_gzip_level(self) -> Result<u32, std::io::Error> {
        match self {
            CompressionLevel::Lowest => Ok(1),
            CompressionLevel::Highest => Ok(9),
            CompressionLevel::Default => Ok(6),
            CompressionLevel::Numeric(n) => {
                if (1..=9).contains(&n) {
                    Ok(n)
                } else {
                    Err(std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        "gzip compression level must be between 1 and 9",
                    ))
                }
            }
        }
    }
}

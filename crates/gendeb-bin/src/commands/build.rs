use std::path::PathBuf;

use gendeb_package_streaming::fs::build_package;
use gendeb_types::{BuildConfig, CompressionLevel};
use miette::{Context, IntoDiagnostic};

#[derive(Debug, clap::Parser)]
pub struct Opt {
    /// The specification document (JSON, or YAML with a `.yaml`/`.yml` extension)
    #[clap(long, required = true)]
    spec: PathBuf,

    /// Override the version in the specification
    #[clap(long)]
    version: Option<String>,

    /// Override the output filename, defaults to `<Package>_<Version>_<Architecture>.deb`
    #[clap(short, long)]
    out: Option<PathBuf>,

    /// The gzip compression level (1-9) of the control and data archives
    #[clap(long, value_parser = clap::value_parser!(u32).range(1..=9))]
    compression_level: Option<u32>,

    /// Unix timestamp recorded for every archive entry
    #[clap(long, env = "SOURCE_DATE_EPOCH")]
    timestamp: Option<i64>,
}

impl Opt {
    /// Turns the command line arguments into a [`BuildConfig`].
    fn into_config(self) -> miette::Result<BuildConfig> {
        let timestamp = self
            .timestamp
            .map(|seconds| {
                if seconds < 0 {
                    miette::bail!("timestamp {seconds} is before 1970-01-01");
                }
                chrono::DateTime::<chrono::Utc>::from_timestamp(seconds, 0)
                    .ok_or_else(|| miette::miette!("timestamp {seconds} is out of range"))
            })
            .transpose()?;

        Ok(BuildConfig {
            spec_path: self.spec,
            version: self.version,
            output: self.out,
            compression_level: self
                .compression_level
                .map_or(CompressionLevel::Default, CompressionLevel::Numeric),
            timestamp,
        })
    }
}

pub fn build(opt: Opt) -> miette::Result<()> {
    let config = opt.into_config()?;
    let spec_path = config.spec_path.clone();
    tracing::debug!("building with {:?}", config);

    let result = build_package(&config)
        .into_diagnostic()
        .with_context(|| format!("Unable to generate deb from {}", spec_path.display()))?;

    println!(
        "{} Wrote deb file to: {}",
        console::style("✓").green(),
        result.path.display()
    );
    println!("  SHA256: {:x}", result.sha256);
    println!("  MD5: {:x}", result.md5);
    println!("  Size: {} bytes", result.total_size);

    Ok(())
}

#[cfg(test)]
mod test {
    use super::Opt;
    use clap::Parser;
    use gendeb_types::CompressionLevel;
    use std::path::PathBuf;

    #[test]
    fn test_into_config() {
        let opt = Opt::try_parse_from([
            "build",
            "--spec",
            "hello.json",
            "--version",
            "9.9",
            "--out",
            "dist/hello.deb",
            "--compression-level",
            "9",
            "--timestamp",
            "1700000000",
        ])
        .unwrap();
        let config = opt.into_config().unwrap();

        assert_eq!(config.spec_path, PathBuf::from("hello.json"));
        assert_eq!(config.version.as_deref(), Some("9.9"));
        assert_eq!(config.output, Some(PathBuf::from("dist/hello.deb")));
        assert_eq!(config.compression_level, CompressionLevel::Numeric(9));
        assert_eq!(
            config.timestamp.map(|timestamp| timestamp.timestamp()),
            Some(1_700_000_000)
        );
    }

    #[test]
    fn test_negative_timestamp_is_rejected() {
        let opt =
            Opt::try_parse_from(["build", "--spec", "a.json", "--timestamp=-86400"]).unwrap();
        assert!(opt.into_config().is_err());
    }

    #[test]
    fn test_spec_is_required() {
        assert!(Opt::try_parse_from(["build"]).is_err());
    }

    #[test]
    fn test_compression_level_range() {
        assert!(
            Opt::try_parse_from(["build", "--spec", "a.json", "--compression-level", "0"]).is_err()
        );
    }
}

use std::{
    fs::File,
    io::{BufReader, Read},
    path::PathBuf,
};

use gendeb_digest::{compute_bytes_digest, Md5};
use gendeb_package_streaming::read::{read_control_archive, read_deb_members, stream_data};
use gendeb_types::DebArchiveIdentifier;
use miette::{Context, IntoDiagnostic};

#[derive(Debug, clap::Parser)]
pub struct Opt {
    /// The package to inspect
    #[clap(required = true)]
    package: PathBuf,
}

fn open(opt: &Opt) -> miette::Result<BufReader<File>> {
    File::open(&opt.package)
        .map(BufReader::new)
        .into_diagnostic()
        .with_context(|| format!("failed to open {}", opt.package.display()))
}

pub fn inspect(opt: Opt) -> miette::Result<()> {
    let context = || format!("failed to read {}", opt.package.display());

    let members = read_deb_members(open(&opt)?)
        .into_diagnostic()
        .with_context(context)?;
    println!("{}", console::style("Members").bold());
    for member in &members {
        let header = &member.header;
        println!("  {:o} {:>10} {}", header.mode, header.size, header.name);
    }

    let control_archive = read_control_archive(open(&opt)?)
        .into_diagnostic()
        .with_context(context)?;
    println!("\n{}", console::style("control").bold());
    print!("{}", control_archive.control);
    println!("\n{}", console::style("md5sums").bold());
    print!("{}", control_archive.md5sums);

    if let Some(identifier) = DebArchiveIdentifier::try_from_path(&opt.package) {
        let control = &control_archive.control;
        if control.get("Package") != Some(identifier.name.as_str())
            || control.get("Version") != Some(identifier.version.as_str())
            || control.get("Architecture") != Some(identifier.architecture.as_str())
        {
            tracing::warn!(
                "the file name {} does not match the control fields of the package",
                identifier
            );
        }
    }

    println!("\n{}", console::style("Data").bold());
    let mut data = stream_data(open(&opt)?)
        .into_diagnostic()
        .with_context(context)?;
    for entry in data.entries().into_diagnostic().with_context(context)? {
        let mut entry = entry.into_diagnostic().with_context(context)?;
        let path = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        let header = entry.header().clone();
        let mut content = Vec::new();
        entry
            .read_to_end(&mut content)
            .into_diagnostic()
            .with_context(context)?;

        let digest = compute_bytes_digest::<Md5>(&content);
        let status = match control_archive.md5sums.digest_of(&path) {
            Some(expected) if *expected == digest => console::style("✓").green(),
            Some(_) => console::style("md5 mismatch").red(),
            None => console::style("not in md5sums").yellow(),
        };
        println!(
            "  {:o} {}/{} {:>10} {} {}",
            header.mode().into_diagnostic()?,
            header.uid().into_diagnostic()?,
            header.gid().into_diagnostic()?,
            content.len(),
            path,
            status
        );
    }

    Ok(())
}

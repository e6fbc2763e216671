use clap::Parser;
use tracing_subscriber::{filter::LevelFilter, util::SubscriberInitExt, EnvFilter};

mod commands;

/// Build Debian binary packages from a specification document
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Build a package from a specification document
    Build(commands::build::Opt),

    /// Show the members, control files and payload of a package
    Inspect(commands::inspect::Opt),
}

/// Entry point of the `gendeb` cli.
fn main() -> miette::Result<()> {
    // Parse the command line arguments
    let cli = Cli::parse();

    // Setup default logging level
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env()
        .map_err(|err| miette::miette!("invalid RUST_LOG: {err}"))?;

    // Setup the tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .finish()
        .try_init()
        .map_err(|err| miette::miette!("failed to initialize logging: {err}"))?;

    // Dispatch the selected command
    match cli.command {
        Commands::Build(opt) => commands::build::build(opt),
        Commands::Inspect(opt) => commands::inspect::inspect(opt),
    }
}

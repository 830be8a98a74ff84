//! Main entry point for the origpack CLI application.
//!
//! Builds a single `.orig.tar.gz` archive from a package definition given
//! either as a JSON file or as command-line flags.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use origpack::{ArchiveBuilder, Cli, layout};

/// Application entry point.
///
/// Parses arguments, sets up logging on stderr and runs one archive build.
/// The archive path is printed on stdout once the build succeeds.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let pkg_def = cli.package_definition()?;
    let builder = ArchiveBuilder::new(cli.options())?;

    builder.build_artifacts_archive(Some(&pkg_def)).await?;

    if !cli.is_quiet() {
        let archive =
            layout::resolve_archive_path(&pkg_def.name, &pkg_def.version, &pkg_def.spec_output_path);
        println!("{}", archive.display());
    }

    Ok(())
}

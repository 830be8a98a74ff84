use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;

use crate::archive::CompressOptions;
use crate::options::{DEFAULT_GCS_ENDPOINT, Options};
use crate::package::{PackageDefinition, PackageVariation};

#[derive(Parser, Debug)]
#[command(name = "origpack")]
#[command(version)]
#[command(about = "Build <name>_<version>.orig.tar.gz archives from release artifacts", long_about = None)]
#[command(after_help = "Examples:\n  \
  origpack -n cri-tools -r 1.30.0 -o out -a amd64=gs://bucket/crictl-amd64.tar.gz\n  \
  origpack -f kubernetes-cni.json -x '\\.sig$'   build from a JSON package definition")]
pub struct Cli {
    /// JSON package definition
    #[arg(short = 'f', long, value_name = "FILE", conflicts_with_all = ["name", "release", "output", "variations"])]
    pub definition: Option<PathBuf>,

    /// Package name
    #[arg(short = 'n', long, requires = "release")]
    pub name: Option<String>,

    /// Package version
    #[arg(short = 'r', long, value_name = "VERSION")]
    pub release: Option<String>,

    /// Directory receiving the staging tree and the archive
    #[arg(short = 'o', long, value_name = "DIR", default_value = ".")]
    pub output: PathBuf,

    /// Artifact source, optionally prefixed with an architecture: [ARCH=]SOURCE
    #[arg(short = 'a', long = "variation", value_name = "VARIATION")]
    pub variations: Vec<String>,

    /// Object-storage endpoint gs:// sources are fetched from
    #[arg(long, value_name = "URL", default_value = DEFAULT_GCS_ENDPOINT)]
    pub gcs_endpoint: String,

    /// Leave out staged paths matching these regexes
    #[arg(short = 'x', long, value_name = "REGEX", num_args = 1..)]
    pub exclude: Vec<String>,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    /// Load the definition file, or assemble one from the flags
    pub fn package_definition(&self) -> Result<PackageDefinition> {
        if let Some(path) = &self.definition {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            return PackageDefinition::from_json(&data)
                .with_context(|| format!("parsing {}", path.display()));
        }

        let Some(name) = &self.name else {
            bail!("either --definition or --name is required");
        };

        Ok(PackageDefinition {
            name: name.clone(),
            version: self.release.clone().unwrap_or_default(),
            spec_output_path: self.output.clone(),
            variations: self.variations.iter().map(|v| parse_variation(v)).collect(),
        })
    }

    pub fn options(&self) -> Options {
        Options {
            compress: CompressOptions {
                excludes: self.exclude.clone(),
                ..CompressOptions::default()
            },
            ..Options::default().with_gcs_endpoint(self.gcs_endpoint.clone())
        }
    }

    /// Default log filter when `RUST_LOG` is unset
    pub fn log_level(&self) -> &'static str {
        match self.quiet {
            0 => "info",
            1 => "warn",
            _ => "error",
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }
}

/// `amd64=gs://b/o` -> (`amd64`, `gs://b/o`); a bare source has no architecture.
fn parse_variation(arg: &str) -> PackageVariation {
    match arg.split_once('=') {
        Some((arch, source)) if !arch.contains(':') && !arch.contains('/') => {
            PackageVariation::new(arch, source)
        }
        _ => PackageVariation::new("", arg),
    }
}

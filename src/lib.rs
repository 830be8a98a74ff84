//! # origpack
//!
//! Build `<name>_<version>.orig.tar.gz` source archives for downstream OS
//! packaging from per-architecture release artifacts.
//!
//! A [`PackageDefinition`] lists one variation per architecture, each pointing
//! at a `gs://` object or an `http(s)://` URL. The [`ArchiveBuilder`] downloads
//! every variation into a staging tree under the spec output directory,
//! unpacks it there, and finally packs the whole tree into a single archive.
//!
//! ## Features
//!
//! - Object-storage (`gs://`) and plain HTTP sources
//! - Package-aware staging layout (see [`layout`])
//! - Deterministic `.tar.gz` output with optional exclude patterns
//! - Every network and filesystem call goes through the [`Impl`] trait, so
//!   builds can run against a fake
//!
//! ## Example
//!
//! ```no_run
//! use origpack::{ArchiveBuilder, Options, PackageDefinition, PackageVariation};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let builder = ArchiveBuilder::new(Options::default())?;
//!
//!     let pkg = PackageDefinition {
//!         name: "cri-tools".to_string(),
//!         version: "1.30.0".to_string(),
//!         spec_output_path: "/tmp/specs".into(),
//!         variations: vec![PackageVariation::new(
//!             "amd64",
//!             "https://example.com/crictl-v1.30.0-linux-amd64.tar.gz",
//!         )],
//!     };
//!
//!     // Writes /tmp/specs/cri-tools_1.30.0.orig.tar.gz
//!     builder.build_artifacts_archive(Some(&pkg)).await?;
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod cli;
pub mod error;
pub mod io;
pub mod layout;
pub mod options;
pub mod package;

pub use archive::{ArchiveBuilder, CompressOptions};
pub use cli::Cli;
pub use error::{ArchiveError, Result};
pub use io::{BytesBody, DefaultImpl, FileWriter, GetResponse, Impl, ResponseBody};
pub use options::Options;
pub use package::{PackageDefinition, PackageVariation, SourceKind};

//! Package definitions handed to the archive builder.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A package to be archived: one or more per-architecture variations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    /// Directory receiving the staging tree and the final archive.
    #[serde(default)]
    pub spec_output_path: PathBuf,
    /// Processed in order.
    #[serde(default)]
    pub variations: Vec<PackageVariation>,
}

/// One retrievable artifact for one architecture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageVariation {
    /// Empty means a single, architecture-less artifact.
    #[serde(default)]
    pub architecture: String,
    /// `gs://bucket/object` or an `http(s)://` URL.
    pub source: String,
}

/// Where a variation's artifact is fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Gcs,
    Http,
}

impl PackageVariation {
    pub fn new(architecture: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            architecture: architecture.into(),
            source: source.into(),
        }
    }

    /// Classify the source by scheme. `None` for unsupported schemes.
    pub fn source_kind(&self) -> Option<SourceKind> {
        if self.source.starts_with("gs://") {
            Some(SourceKind::Gcs)
        } else if self.source.starts_with("http://") || self.source.starts_with("https://") {
            Some(SourceKind::Http)
        } else {
            None
        }
    }
}

impl PackageDefinition {
    pub fn from_json(data: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(data)?)
    }
}

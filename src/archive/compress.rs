use anyhow::{Context, Result};
use flate2::{Compression, GzBuilder};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use walkdir::WalkDir;

/// Options for packing the staging directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressOptions {
    /// Regexes matched against each entry's path relative to the source directory.
    /// Matching entries (and everything below a matching directory) are left out.
    pub excludes: Vec<String>,
    /// gzip level, 0-9
    pub level: u32,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            excludes: Vec::new(),
            level: 6,
        }
    }
}

impl CompressOptions {
    pub fn with_exclude(mut self, pattern: impl Into<String>) -> Self {
        self.excludes.push(pattern.into());
        self
    }

    pub fn compile(&self) -> Result<Vec<Regex>> {
        self.excludes
            .iter()
            .map(|p| Regex::new(p).with_context(|| format!("invalid exclude pattern {p:?}")))
            .collect()
    }
}

/// Write a deterministic `.tar.gz` of everything below `source_dir`.
///
/// Entry names are relative to `source_dir` and emitted in sorted order with
/// normalized ownership and timestamps, so identical trees produce identical
/// archives. A missing `source_dir` yields an empty archive.
pub fn compress(archive: &Path, source_dir: &Path, options: &CompressOptions) -> Result<()> {
    let excludes = options.compile()?;

    let file = File::create(archive).with_context(|| format!("creating {}", archive.display()))?;
    let encoder = GzBuilder::new()
        .mtime(0)
        .operating_system(255)
        .write(BufWriter::new(file), Compression::new(options.level.min(9)));

    let mut tar = tar::Builder::new(encoder);
    tar.mode(tar::HeaderMode::Deterministic);
    tar.follow_symlinks(false);

    if source_dir.is_dir() {
        let mut walker = WalkDir::new(source_dir)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = walker.next() {
            let entry = entry.with_context(|| format!("walking {}", source_dir.display()))?;
            let rel = entry.path().strip_prefix(source_dir)?;

            let name = rel.to_string_lossy();
            if excludes.iter().any(|re| re.is_match(&name)) {
                if entry.file_type().is_dir() {
                    walker.skip_current_dir();
                }
                continue;
            }

            tar.append_path_with_name(entry.path(), rel)
                .with_context(|| format!("adding {}", rel.display()))?;
        }
    }

    let encoder = tar.into_inner().context("finishing tar stream")?;
    encoder
        .finish()
        .context("finishing gzip stream")?
        .flush()
        .context("flushing archive")?;

    Ok(())
}

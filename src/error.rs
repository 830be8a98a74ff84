//! Error types for archive builds.

use std::path::{Path, PathBuf};

/// Failure of a single archive build. The first failing step wins.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// The caller passed something the builder cannot work with.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Object-storage copy or HTTP transport failure.
    #[error("retrieving {source_uri}: {message}")]
    Retrieval { source_uri: String, message: String },

    /// HTTP request completed with anything other than 200.
    #[error("retrieving {url}: unexpected HTTP status code {status}")]
    HttpStatus { url: String, status: u16 },

    /// Directory creation, file creation/write or removal failure.
    #[error("{op} {}: {source}", .path.display())]
    Filesystem {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("extracting {}: {message}", .archive.display())]
    Extraction { archive: PathBuf, message: String },

    #[error("compressing {} into {}: {message}", .source_dir.display(), .archive.display())]
    Compression {
        archive: PathBuf,
        source_dir: PathBuf,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, ArchiveError>;

impl ArchiveError {
    pub(crate) fn fs(op: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Filesystem {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    /// True for every failure to fetch an artifact, including bad status codes.
    pub fn is_retrieval(&self) -> bool {
        matches!(self, Self::Retrieval { .. } | Self::HttpStatus { .. })
    }

    pub fn is_filesystem(&self) -> bool {
        matches!(self, Self::Filesystem { .. })
    }
}

/// Render an anyhow chain on one line, `outer: inner: root`.
pub(crate) fn chain(err: &anyhow::Error) -> String {
    format!("{err:#}")
}

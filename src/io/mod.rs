mod http;
mod local;

pub use http::{HttpClient, ReqwestBody};
pub use local::DefaultImpl;

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use tokio::io::AsyncWrite;

use crate::archive::CompressOptions;

/// Writable handle returned by [`Impl::create_file`].
pub type FileWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Streaming body of an HTTP response
#[async_trait]
pub trait ResponseBody: Send {
    /// Next chunk of the body, `None` once exhausted
    async fn chunk(&mut self) -> Result<Option<Vec<u8>>>;
}

/// Status and body of a completed GET request
pub struct GetResponse {
    pub status: u16,
    pub body: Box<dyn ResponseBody>,
}

/// Everything the archive builder needs from the outside world.
///
/// Network, filesystem and archive operations all go through this trait so a
/// build can run against a fake in tests.
#[async_trait]
pub trait Impl: Send + Sync {
    /// Copy a `gs://bucket/object` URI to a local file
    async fn gcs_copy_to_local(&self, source: &str, dest: &Path) -> Result<()>;

    /// Issue a GET request; transport failures are errors, status codes are not
    async fn get_request(&self, url: &str) -> Result<GetResponse>;

    async fn create_file(&self, path: &Path) -> std::io::Result<FileWriter>;

    /// Unpack `archive` into `dest_dir`
    async fn extract(&self, archive: &Path, dest_dir: &Path) -> Result<()>;

    async fn remove_file(&self, path: &Path) -> std::io::Result<()>;

    async fn remove_all(&self, path: &Path) -> std::io::Result<()>;

    async fn mkdir_all(&self, path: &Path) -> std::io::Result<()>;

    fn exists(&self, path: &Path) -> bool;

    /// Pack the contents of `source_dir` into the `.tar.gz` at `archive`
    async fn compress(
        &self,
        archive: &Path,
        source_dir: &Path,
        options: &CompressOptions,
    ) -> Result<()>;
}

/// Body that yields one in-memory buffer and then ends
pub struct BytesBody(Option<Vec<u8>>);

impl BytesBody {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self(Some(data.into()))
    }

    pub fn empty() -> Self {
        Self(None)
    }
}

#[async_trait]
impl ResponseBody for BytesBody {
    async fn chunk(&mut self) -> Result<Option<Vec<u8>>> {
        Ok(self.0.take())
    }
}

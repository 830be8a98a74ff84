use super::{FileWriter, GetResponse, HttpClient, Impl};
use crate::archive::{self, CompressOptions};
use crate::options::Options;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Production implementation: real network, real disk
pub struct DefaultImpl {
    http: HttpClient,
}

impl DefaultImpl {
    pub fn new(options: &Options) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(options)?,
        })
    }
}

#[async_trait]
impl Impl for DefaultImpl {
    async fn gcs_copy_to_local(&self, source: &str, dest: &Path) -> Result<()> {
        self.http.copy_object(source, dest).await
    }

    async fn get_request(&self, url: &str) -> Result<GetResponse> {
        self.http.get(url).await
    }

    async fn create_file(&self, path: &Path) -> std::io::Result<FileWriter> {
        let file = fs::File::create(path).await?;
        Ok(Box::new(file))
    }

    async fn extract(&self, archive: &Path, dest_dir: &Path) -> Result<()> {
        let (tarball, dest_dir) = (archive.to_path_buf(), dest_dir.to_path_buf());
        tokio::task::spawn_blocking(move || archive::extract(&tarball, &dest_dir))
            .await
            .context("extraction task panicked")?
    }

    async fn remove_file(&self, path: &Path) -> std::io::Result<()> {
        fs::remove_file(path).await
    }

    async fn remove_all(&self, path: &Path) -> std::io::Result<()> {
        match fs::remove_dir_all(path).await {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            res => res,
        }
    }

    async fn mkdir_all(&self, path: &Path) -> std::io::Result<()> {
        fs::create_dir_all(path).await
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    async fn compress(
        &self,
        archive: &Path,
        source_dir: &Path,
        options: &CompressOptions,
    ) -> Result<()> {
        let (output, source_dir): (PathBuf, PathBuf) = (archive.to_path_buf(), source_dir.to_path_buf());
        let options = options.clone();
        tokio::task::spawn_blocking(move || archive::compress(&output, &source_dir, &options))
            .await
            .context("compression task panicked")?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    fn default_impl() -> DefaultImpl {
        DefaultImpl::new(&Options::default()).unwrap()
    }

    #[tokio::test]
    async fn test_remove_all_missing_directory_succeeds() {
        let tmp = tempfile::tempdir().unwrap();
        let fs_impl = default_impl();
        fs_impl.remove_all(&tmp.path().join("missing")).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_file_and_remove() {
        let tmp = tempfile::tempdir().unwrap();
        let fs_impl = default_impl();
        let dir = tmp.path().join("cri-o/x86_64");
        let path = dir.join("cri-o.tar.gz");

        fs_impl.mkdir_all(&dir).await.unwrap();
        // Creating an existing directory tree is not an error
        fs_impl.mkdir_all(&dir).await.unwrap();

        let mut file = fs_impl.create_file(&path).await.unwrap();
        file.write_all(b"payload").await.unwrap();
        file.flush().await.unwrap();
        drop(file);

        assert!(fs_impl.exists(&path));
        assert_eq!(std::fs::read(&path).unwrap(), b"payload");

        fs_impl.remove_file(&path).await.unwrap();
        assert!(!fs_impl.exists(&path));
        assert!(fs_impl.remove_file(&path).await.is_err());
    }
}

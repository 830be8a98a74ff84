use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::error::{ArchiveError, Result, chain};
use crate::io::{DefaultImpl, Impl};
use crate::layout;
use crate::options::Options;
use crate::package::{PackageDefinition, PackageVariation, SourceKind};

/// Builds `<name>_<version>.orig.tar.gz` archives from package definitions
pub struct ArchiveBuilder {
    options: Options,
    imp: Arc<dyn Impl>,
}

impl ArchiveBuilder {
    /// Create a builder backed by the real network and filesystem
    pub fn new(options: Options) -> anyhow::Result<Self> {
        let imp = Arc::new(DefaultImpl::new(&options)?);
        Ok(Self { options, imp })
    }

    /// Replace the capability implementation, e.g. with a fake in tests
    pub fn set_impl(&mut self, imp: Arc<dyn Impl>) {
        self.imp = imp;
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Download, extract and repack every variation of `pkg_def`.
    ///
    /// Variations are processed one after another; the first failure aborts
    /// the build and nothing already staged is rolled back. The staging
    /// directory is removed only after the archive has been written, so a
    /// failure in that last step still leaves the archive on disk.
    pub async fn build_artifacts_archive(&self, pkg_def: Option<&PackageDefinition>) -> Result<()> {
        let pkg_def = pkg_def.ok_or_else(|| {
            ArchiveError::InvalidArgument("package definition cannot be nil".to_string())
        })?;

        info!(
            name = %pkg_def.name,
            version = %pkg_def.version,
            variations = pkg_def.variations.len(),
            "building artifacts archive"
        );

        for variation in &pkg_def.variations {
            self.stage_variation(pkg_def, variation).await?;
        }

        let out = &pkg_def.spec_output_path;
        let staging = layout::staging_dir(&pkg_def.name, out);
        let archive = layout::resolve_archive_path(&pkg_def.name, &pkg_def.version, out);

        // Nothing was staged; give the archiver an empty directory to pack
        if !self.imp.exists(&staging) {
            self.ensure_dir(&staging).await?;
        }

        debug!(archive = %archive.display(), staging = %staging.display(), "compressing");
        self.imp
            .compress(&archive, &staging, &self.options.compress)
            .await
            .map_err(|e| ArchiveError::Compression {
                archive: archive.clone(),
                source_dir: staging.clone(),
                message: chain(&e),
            })?;

        self.imp
            .remove_all(&staging)
            .await
            .map_err(|e| ArchiveError::fs("removing staging directory", &staging, e))?;

        info!(archive = %archive.display(), "artifacts archive ready");
        Ok(())
    }

    /// Fetch one variation into staging, unpack it and drop the download
    async fn stage_variation(&self, pkg_def: &PackageDefinition, variation: &PackageVariation) -> Result<()> {
        let dest = layout::resolve_destination(
            &pkg_def.name,
            &variation.architecture,
            &pkg_def.spec_output_path,
        );
        let dest_dir = dest.parent().unwrap_or(Path::new(""));

        info!(
            architecture = %variation.architecture,
            source = %variation.source,
            dest = %dest.display(),
            "downloading artifact"
        );

        self.ensure_dir(dest_dir).await?;

        match variation.source_kind() {
            Some(SourceKind::Gcs) => self.fetch_gcs(&variation.source, &dest).await?,
            Some(SourceKind::Http) => self.fetch_http(&variation.source, &dest).await?,
            None => {
                return Err(ArchiveError::InvalidArgument(format!(
                    "unsupported source {:?}: expected gs:// or http(s)://",
                    variation.source
                )));
            }
        }

        debug!(archive = %dest.display(), "extracting");
        self.imp
            .extract(&dest, dest_dir)
            .await
            .map_err(|e| ArchiveError::Extraction {
                archive: dest.clone(),
                message: chain(&e),
            })?;

        self.imp
            .remove_file(&dest)
            .await
            .map_err(|e| ArchiveError::fs("removing downloaded archive", &dest, e))?;

        Ok(())
    }

    /// Create `dir` and its parents; an existing directory is fine
    async fn ensure_dir(&self, dir: &Path) -> Result<()> {
        match self.imp.mkdir_all(dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                warn!(dir = %dir.display(), "directory already exists, reusing it");
                Ok(())
            }
            Err(e) => Err(ArchiveError::fs("creating directory", dir, e)),
        }
    }

    async fn fetch_gcs(&self, source: &str, dest: &Path) -> Result<()> {
        self.imp
            .gcs_copy_to_local(source, dest)
            .await
            .map_err(|e| ArchiveError::Retrieval {
                source_uri: source.to_string(),
                message: chain(&e),
            })
    }

    async fn fetch_http(&self, url: &str, dest: &Path) -> Result<()> {
        let mut resp = self
            .imp
            .get_request(url)
            .await
            .map_err(|e| ArchiveError::Retrieval {
                source_uri: url.to_string(),
                message: chain(&e),
            })?;

        if resp.status != 200 {
            return Err(ArchiveError::HttpStatus {
                url: url.to_string(),
                status: resp.status,
            });
        }

        let mut file = self
            .imp
            .create_file(dest)
            .await
            .map_err(|e| ArchiveError::fs("creating file", dest, e))?;

        let mut written = 0u64;
        while let Some(chunk) = resp.body.chunk().await.map_err(|e| ArchiveError::Retrieval {
            source_uri: url.to_string(),
            message: chain(&e),
        })? {
            file.write_all(&chunk)
                .await
                .map_err(|e| ArchiveError::fs("writing file", dest, e))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| ArchiveError::fs("writing file", dest, e))?;

        debug!(bytes = written, dest = %dest.display(), "download complete");
        Ok(())
    }
}

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::{GetResponse, ResponseBody};
use crate::options::Options;
use anyhow::{Context, Result, anyhow, bail};

/// HTTP client shared by plain URL downloads and object-storage copies
pub struct HttpClient {
    client: Client,
    gcs_endpoint: String,
    gcs_token: Option<String>,
}

impl HttpClient {
    pub fn new(options: &Options) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = options.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            gcs_endpoint: options.gcs_endpoint.trim_end_matches('/').to_string(),
            gcs_token: options.gcs_token.clone(),
        })
    }

    /// Send a GET request. Any status code is returned as-is.
    pub async fn get(&self, url: &str) -> Result<GetResponse> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;

        Ok(GetResponse {
            status: resp.status().as_u16(),
            body: Box::new(ReqwestBody(resp)),
        })
    }

    /// Download `gs://bucket/object` into `dest` through the storage endpoint
    pub async fn copy_object(&self, uri: &str, dest: &Path) -> Result<()> {
        let url = object_url(&self.gcs_endpoint, uri)?;
        debug!(%uri, %url, "fetching object");

        let mut req = self.client.get(&url);
        if let Some(token) = &self.gcs_token {
            req = req.bearer_auth(token);
        }
        let mut resp = req.send().await.with_context(|| format!("GET {url}"))?;

        if resp.status() != StatusCode::OK {
            bail!("object request failed with status: {}", resp.status());
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .with_context(|| format!("creating {}", dest.display()))?;
        while let Some(chunk) = resp.chunk().await? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        Ok(())
    }
}

/// Map `gs://bucket/path/to/object` onto `<endpoint>/bucket/path/to/object`
pub(crate) fn object_url(endpoint: &str, uri: &str) -> Result<String> {
    let rest = uri
        .strip_prefix("gs://")
        .ok_or_else(|| anyhow!("not a gs:// URI: {uri}"))?;

    let (bucket, object) = match rest.split_once('/') {
        Some((bucket, object)) if !bucket.is_empty() && !object.is_empty() => (bucket, object),
        _ => bail!("gs:// URI must name a bucket and an object: {uri}"),
    };

    // Object keys may hold '#', '?', '%' or spaces; encode each segment
    let mut url = Url::parse(endpoint).with_context(|| format!("invalid endpoint {endpoint}"))?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("endpoint cannot be a base URL: {endpoint}"))?
        .pop_if_empty()
        .push(bucket)
        .extend(object.split('/'));

    Ok(url.into())
}

/// Response body read chunk by chunk from the network
pub struct ReqwestBody(reqwest::Response);

#[async_trait]
impl ResponseBody for ReqwestBody {
    async fn chunk(&mut self) -> Result<Option<Vec<u8>>> {
        Ok(self.0.chunk().await?.map(|bytes| bytes.to_vec()))
    }
}

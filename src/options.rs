use serde::{Deserialize, Serialize};

use crate::archive::CompressOptions;

pub const DEFAULT_GCS_ENDPOINT: &str = "https://storage.googleapis.com";

/// Builder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    /// Base URL `gs://bucket/object` sources are fetched from.
    pub gcs_endpoint: String,
    /// Bearer token sent with object-storage requests.
    pub gcs_token: Option<String>,
    /// Connect timeout for HTTP and object-storage requests. `None` keeps the client default.
    pub connect_timeout_secs: Option<u64>,
    pub compress: CompressOptions,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            gcs_endpoint: DEFAULT_GCS_ENDPOINT.to_string(),
            gcs_token: None,
            connect_timeout_secs: None,
            compress: CompressOptions::default(),
        }
    }
}

impl Options {
    pub fn with_gcs_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.gcs_endpoint = endpoint.into();
        self
    }

    pub fn with_gcs_token(mut self, token: impl Into<String>) -> Self {
        self.gcs_token = Some(token.into());
        self
    }
}

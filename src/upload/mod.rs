//! Image upload collaborator.
//!
//! Product images arrive as a local path or a remote URL and are stored as the
//! hosted URL returned by the upload service. The uploader is configured through
//! an explicit [`UploaderConfig`] handed to it at construction.

mod http;

pub use http::HttpImageUploader;

use crate::errors::Result;
use async_trait::async_trait;
use mockall::automock;
use std::time::Duration;

/// Connection settings for [`HttpImageUploader`].
#[derive(Debug, Clone)]
pub struct UploaderConfig {
    /// Base URL of the upload API, without the cloud name
    pub api_base: String,
    /// Cloud (account) name
    pub cloud_name: String,
    /// Unsigned upload preset
    pub upload_preset: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Use the source file name as the asset's public id
    pub use_filename: bool,
}

impl UploaderConfig {
    /// Endpoint images are posted to.
    pub fn upload_url(&self) -> String {
        format!(
            "{}/{}/image/upload",
            self.api_base.trim_end_matches('/'),
            self.cloud_name
        )
    }
}

#[automock]
#[async_trait]
pub trait ImageUploader: Send + Sync {
    /// Uploads the image at `source` (file path or URL) and returns its hosted URL.
    async fn upload(&self, source: &str) -> Result<String>;
}

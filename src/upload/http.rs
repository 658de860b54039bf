use crate::{
    errors::{Error, Result},
    upload::{ImageUploader, UploaderConfig},
};
use async_trait::async_trait;
use reqwest::{
    Client,
    multipart::{Form, Part},
};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, error, info, instrument};

/// HTTP client for a Cloudinary-style unsigned upload endpoint.
#[derive(Debug, Clone)]
pub struct HttpImageUploader {
    config: UploaderConfig,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

impl HttpImageUploader {
    /// Creates an uploader from `config`.
    ///
    /// # Errors
    /// Returns `Error::Config` if the HTTP client cannot be built.
    pub fn new(config: UploaderConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config {
                message: format!("Failed to build upload client: {e}"),
            })?;

        Ok(Self { config, http })
    }

    async fn file_field(&self, source: &str) -> Result<Part> {
        if is_remote(source) {
            return Ok(Part::text(source.to_string()));
        }

        let bytes = tokio::fs::read(source).await.map_err(|e| Error::Upload {
            message: format!("Failed to read image '{source}': {e}"),
        })?;
        let file_name = Path::new(source)
            .file_name()
            .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().into_owned());

        Ok(Part::bytes(bytes).file_name(file_name))
    }
}

fn is_remote(source: &str) -> bool {
    ["http://", "https://", "data:"]
        .iter()
        .any(|prefix| source.starts_with(prefix))
}

#[async_trait]
impl ImageUploader for HttpImageUploader {
    #[instrument(skip(self))]
    async fn upload(&self, source: &str) -> Result<String> {
        if self.config.cloud_name.is_empty() || self.config.upload_preset.is_empty() {
            return Err(Error::Upload {
                message: "image uploader is not configured".to_string(),
            });
        }

        let form = Form::new()
            .part("file", self.file_field(source).await?)
            .text("upload_preset", self.config.upload_preset.clone())
            .text("use_filename", self.config.use_filename.to_string())
            .text("unique_filename", "false");

        let url = self.config.upload_url();
        debug!("Posting image to {}", url);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Upload {
                message: format!("request failed: {e}"),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            error!("Image upload rejected with status {}: {}", status, text);

            return Err(Error::Upload {
                message: format!("upload failed with status {status}: {text}"),
            });
        }

        let parsed: UploadResponse = response.json().await.map_err(|e| Error::Upload {
            message: format!("unexpected response body: {e}"),
        })?;

        info!("Uploaded image to {}", parsed.secure_url);
        Ok(parsed.secure_url)
    }
}

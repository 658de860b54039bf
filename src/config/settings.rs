//! Application settings loading from config.toml
//!
//! Settings that are safe to commit (database location, uploader endpoint and
//! options) live in `config.toml`. The upload preset can be overridden from the
//! environment, where `.env` files loaded through `dotenvy` also land.

use crate::errors::{Error, Result};
use crate::upload::UploaderConfig;
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Database URL; `DATABASE_URL` takes precedence when set
    #[serde(default)]
    pub database_url: Option<String>,
    /// Image uploader settings
    #[serde(default)]
    pub uploader: UploaderSettings,
}

/// `[uploader]` section of config.toml
#[derive(Debug, Clone, Deserialize)]
pub struct UploaderSettings {
    /// Base URL of the upload API
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Cloud (account) name the images are uploaded to
    #[serde(default)]
    pub cloud_name: String,
    /// Name of the unsigned upload preset
    #[serde(default)]
    pub upload_preset: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Use the uploaded file's name as the public id
    #[serde(default = "default_true")]
    pub use_filename: bool,
}

fn default_api_base() -> String {
    "https://api.cloudinary.com/v1_1".to_string()
}

const fn default_timeout_secs() -> u64 {
    60
}

const fn default_true() -> bool {
    true
}

impl Default for UploaderSettings {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            cloud_name: String::new(),
            upload_preset: String::new(),
            timeout_secs: default_timeout_secs(),
            use_filename: true,
        }
    }
}

impl AppConfig {
    /// Builds the uploader configuration, letting `CLOUD_NAME` and
    /// `CLOUD_UPLOAD_PRESET` from the environment override the file values.
    pub fn uploader_config(&self) -> UploaderConfig {
        let settings = &self.uploader;
        UploaderConfig {
            api_base: settings.api_base.clone(),
            cloud_name: std::env::var("CLOUD_NAME").unwrap_or_else(|_| settings.cloud_name.clone()),
            upload_preset: std::env::var("CLOUD_UPLOAD_PRESET")
                .unwrap_or_else(|_| settings.upload_preset.clone()),
            timeout: std::time::Duration::from_secs(settings.timeout_secs),
            use_filename: settings.use_filename,
        }
    }
}

/// Loads application settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from `./config.toml`, falling back to defaults when the file is absent.
pub fn load_default_config() -> Result<AppConfig> {
    let path = Path::new("config.toml");
    if !path.exists() {
        tracing::info!("No config.toml found, using default settings.");
        return Ok(AppConfig::default());
    }
    load_config(path)
}

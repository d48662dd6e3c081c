use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use url::Url;

use super::config::required;
use super::traits::AssetStore;
use crate::error::Error;

/// Asset host configuration.
///
/// The upload endpoint accepts a multipart form with a base64 data-URI
/// `file` field and a `folder` field, authenticated by bearer key, and
/// answers with JSON `{"secure_url": "..."}`.
#[derive(Debug, Clone)]
pub struct AssetHostConfig {
    pub(crate) upload_url: Url,
    pub(crate) api_key: String,
    pub(crate) folder: String,
}

impl AssetHostConfig {
    #[must_use]
    pub fn new(upload_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            upload_url,
            api_key: api_key.into(),
            folder: "emails".into(),
        }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `BACKOFFICE_ASSET_UPLOAD_URL` (must be a valid URL)
    /// - `BACKOFFICE_ASSET_API_KEY`
    ///
    /// # Optional env vars
    /// - `BACKOFFICE_ASSET_FOLDER`: target folder (default `emails`)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if required env vars are missing or the
    /// URL is invalid.
    pub fn from_env() -> Result<Self, Error> {
        let upload_url: Url = required("BACKOFFICE_ASSET_UPLOAD_URL")?
            .parse()
            .map_err(|e| Error::Config(format!("BACKOFFICE_ASSET_UPLOAD_URL: {e}")))?;
        let api_key = required("BACKOFFICE_ASSET_API_KEY")?;

        let mut config = Self::new(upload_url, api_key);
        if let Ok(folder) = std::env::var("BACKOFFICE_ASSET_FOLDER") {
            config = config.with_folder(folder);
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }
}

/// [`AssetStore`] backed by an HTTP asset host.
pub struct HttpAssetStore {
    config: AssetHostConfig,
    http: reqwest::Client,
}

#[derive(Debug, thiserror::Error)]
#[error("asset host returned {status}: {body}")]
struct UploadFailed {
    status: u16,
    body: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: Url,
}

impl HttpAssetStore {
    #[must_use]
    pub fn new(config: AssetHostConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Convenience for [`AssetHostConfig::from_env`] + [`new`](Self::new).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on missing or invalid env vars.
    pub fn from_env() -> Result<Self, Error> {
        Ok(Self::new(AssetHostConfig::from_env()?))
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }
}

impl AssetStore for HttpAssetStore {
    async fn store(
        &self,
        payload: &[u8],
        media_type: &str,
    ) -> Result<Url, Box<dyn std::error::Error + Send + Sync>> {
        let data_uri = format!("data:{media_type};base64,{}", STANDARD.encode(payload));
        let form = reqwest::multipart::Form::new()
            .text("file", data_uri)
            .text("folder", self.config.folder.clone());

        let response = self
            .http
            .post(self.config.upload_url.clone())
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Box::new(UploadFailed { status, body }));
        }

        Ok(response.json::<UploadResponse>().await?.secure_url)
    }
}

//! External media store client
//!
//! The store is reached through two operations only: an idempotent delete by
//! asset identifier and an upload of raw bytes into a folder. [`AssetStore`]
//! is the seam the cleanup and upload features depend on; [`CloudinaryStore`]
//! implements it over the store's HTTP API.

use anyhow::Context;
use async_trait::async_trait;
use orb_common::AssetId;
use reqwest::{multipart, Client};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{debug, info, instrument};

pub mod config;

use config::{StoreConfig, StoreCredentials};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Missing store credentials")]
    MissingCredentials,
    #[error("Store call timed out after {0:?}")]
    Timeout(Duration),
    #[error("Store request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Store rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("Store returned an unreadable response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),
}

/// Raw bytes to place in the store
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub bytes: Vec<u8>,
    pub folder: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedAsset {
    pub public_id: String,
    pub secure_url: String,
}

#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Fails when the store cannot be called at all (e.g. no credentials).
    fn check_ready(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Delete an asset. Deleting an asset that is already gone succeeds.
    ///
    /// Returns the store's response body.
    async fn delete(&self, id: &AssetId) -> Result<serde_json::Value, StoreError>;

    /// Upload bytes and return the delivery URL of the new asset.
    async fn upload(&self, request: UploadRequest) -> Result<UploadedAsset, StoreError>;
}

#[derive(Clone)]
pub struct CloudinaryStore {
    client: Client,
    config: StoreConfig,
}

impl CloudinaryStore {
    pub fn new(config: StoreConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build store HTTP client")?;

        info!(
            api_base = %config.api_base,
            cloud_name = ?config.cloud_name,
            "Store client initialized"
        );

        Ok(Self { client, config })
    }

    fn credentials(&self) -> Result<StoreCredentials, StoreError> {
        self.config
            .credentials()
            .ok_or(StoreError::MissingCredentials)
    }

    fn endpoint(&self, cloud_name: &str, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.api_base.trim_end_matches('/'),
            cloud_name,
            path
        )
    }

    fn transport_error(&self, err: reqwest::Error) -> StoreError {
        if err.is_timeout() {
            StoreError::Timeout(Duration::from_secs(self.config.timeout_secs))
        } else {
            StoreError::Transport(err)
        }
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<String, StoreError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl AssetStore for CloudinaryStore {
    fn check_ready(&self) -> Result<(), StoreError> {
        self.credentials().map(|_| ())
    }

    #[instrument(skip(self), fields(public_id = %id))]
    async fn delete(&self, id: &AssetId) -> Result<serde_json::Value, StoreError> {
        let credentials = self.credentials()?;
        let url = self.endpoint(&credentials.cloud_name, "resources/image/upload");

        debug!("Deleting asset from store");

        let response = self
            .client
            .delete(&url)
            .basic_auth(&credentials.api_key, Some(&credentials.api_secret))
            .query(&[("public_ids[]", id.as_str())])
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let body = self.read_body(response).await?;
        let value = serde_json::from_str(&body)?;

        info!("Asset deleted from store");

        Ok(value)
    }

    #[instrument(skip(self, request), fields(folder = %request.folder, size = request.bytes.len()))]
    async fn upload(&self, request: UploadRequest) -> Result<UploadedAsset, StoreError> {
        let credentials = self.credentials()?;
        let url = self.endpoint(&credentials.cloud_name, "auto/upload");
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[("folder", request.folder.as_str()), ("timestamp", timestamp.as_str())],
            &credentials.api_secret,
        );

        let mut file = multipart::Part::bytes(request.bytes)
            .file_name(request.filename.unwrap_or_else(|| "upload".to_string()));
        if let Some(content_type) = request.content_type {
            file = file
                .mime_str(&content_type)
                .map_err(|_| StoreError::InvalidUpload(format!("bad content type '{}'", content_type)))?;
        }

        let form = multipart::Form::new()
            .part("file", file)
            .text("folder", request.folder)
            .text("timestamp", timestamp)
            .text("api_key", credentials.api_key)
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let body = self.read_body(response).await?;
        let uploaded: UploadedAsset = serde_json::from_str(&body)?;

        info!(public_id = %uploaded.public_id, "Asset uploaded to store");

        Ok(uploaded)
    }
}

/// Signature over alphabetically sorted `key=value` pairs joined by `&`,
/// followed by the API secret.
pub(crate) fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

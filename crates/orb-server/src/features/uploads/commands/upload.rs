use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::DEFAULT_UPLOAD_FOLDER;
use crate::storage::{AssetStore, StoreError, UploadRequest};

#[derive(Clone)]
pub struct UploadContext {
    pub store: Arc<dyn AssetStore>,
    /// Prefix for every upload folder, e.g. "orbfood"
    pub folder_root: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadAssetCommand {
    pub folder: Option<String>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    #[serde(skip)]
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadAssetResponse {
    pub secure_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadAssetError {
    #[error("No file uploaded")]
    FileRequired,
    #[error("Invalid folder '{0}'")]
    InvalidFolder(String),
    #[error("Invalid content type '{0}'")]
    InvalidContentType(String),
    #[error("{0}")]
    Store(#[from] StoreError),
}

impl UploadAssetCommand {
    pub fn validate(&self) -> Result<(), UploadAssetError> {
        if self.content.is_empty() {
            return Err(UploadAssetError::FileRequired);
        }
        if let Some(content_type) = &self.content_type {
            content_type
                .parse::<mime::Mime>()
                .map_err(|_| UploadAssetError::InvalidContentType(content_type.clone()))?;
        }
        self.target_folder("")?;
        Ok(())
    }

    /// `<root>/<folder>`, with the default folder when none was given.
    pub fn target_folder(&self, root: &str) -> Result<String, UploadAssetError> {
        let requested = self
            .folder
            .as_deref()
            .map(|f| f.trim().trim_matches('/'))
            .filter(|f| !f.is_empty())
            .unwrap_or(DEFAULT_UPLOAD_FOLDER);

        let valid = requested.split('/').all(|segment| {
            !segment.is_empty()
                && segment != "."
                && segment != ".."
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        });
        if !valid {
            return Err(UploadAssetError::InvalidFolder(requested.to_string()));
        }

        let root = root.trim().trim_matches('/');
        if root.is_empty() {
            Ok(requested.to_string())
        } else {
            Ok(format!("{}/{}", root, requested))
        }
    }
}

#[tracing::instrument(skip(ctx, command), fields(folder = ?command.folder, size = command.content.len()))]
pub async fn handle(
    ctx: &UploadContext,
    command: UploadAssetCommand,
) -> Result<UploadAssetResponse, UploadAssetError> {
    command.validate()?;

    let folder = command.target_folder(&ctx.folder_root)?;
    let uploaded = ctx
        .store
        .upload(UploadRequest {
            bytes: command.content,
            folder,
            filename: command.filename,
            content_type: command.content_type,
        })
        .await?;

    Ok(UploadAssetResponse {
        secure_url: uploaded.secure_url,
    })
}

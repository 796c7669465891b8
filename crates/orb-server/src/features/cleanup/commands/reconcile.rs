use futures::stream::{self, StreamExt};
use orb_common::{AssetId, AssetResolver};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};

use crate::features::cleanup::normalize::{normalize, AssetFieldMap, ChangeNotification};
use crate::storage::{AssetStore, StoreError};

/// Everything a cleanup run needs; cloned into the webhook route state.
#[derive(Clone)]
pub struct CleanupContext {
    pub store: Arc<dyn AssetStore>,
    pub resolver: AssetResolver,
    pub field_map: Arc<AssetFieldMap>,
    /// Maximum store deletes in flight for one notification
    pub concurrency: usize,
    /// Upper bound for each store delete
    pub call_timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileCommand {
    pub notification: ChangeNotification,
}

/// Per-candidate result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanupEntry {
    pub url: String,
    #[serde(rename = "publicId")]
    pub public_id: Option<AssetId>,
    pub status: CleanupStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum CleanupStatus {
    /// The store accepted the delete; `response` is its body.
    Deleted { response: serde_json::Value },
    /// Not a delivery URL of the store.
    Skipped,
    StoreError { error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    /// The record kind is not managed by the cleanup webhook.
    UnsupportedKind,
    /// The change left no asset unreferenced.
    NothingToClean,
    Cleaned(Vec<CleanupEntry>),
}

impl ReconcileOutcome {
    pub fn results(&self) -> &[CleanupEntry] {
        match self {
            ReconcileOutcome::Cleaned(entries) => entries,
            _ => &[],
        }
    }

    /// Human readable reason for outcomes that did no work.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            ReconcileOutcome::UnsupportedKind => Some("Table not supported for cleanup."),
            ReconcileOutcome::NothingToClean => Some("No images to cleanup."),
            ReconcileOutcome::Cleaned(_) => None,
        }
    }
}

/// Failures of the whole call. Per-candidate failures are reported in
/// [`CleanupStatus::StoreError`] instead.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[tracing::instrument(
    skip(ctx, command),
    fields(table = %command.notification.table, change = %command.notification.change)
)]
pub async fn handle(
    ctx: &CleanupContext,
    command: ReconcileCommand,
) -> Result<ReconcileOutcome, ReconcileError> {
    let notification = command.notification;

    if !ctx.field_map.supports(&notification.table) {
        tracing::debug!("Record kind is not managed, ignoring notification");
        return Ok(ReconcileOutcome::UnsupportedKind);
    }

    let candidates = normalize(&notification, &ctx.field_map);
    if candidates.is_empty() {
        tracing::debug!("No orphaned assets in notification");
        return Ok(ReconcileOutcome::NothingToClean);
    }

    let resolved: Vec<(String, Option<AssetId>)> = candidates
        .into_iter()
        .map(|url| {
            let id = ctx.resolver.resolve(&url);
            (url, id)
        })
        .collect();

    if resolved.iter().any(|(_, id)| id.is_some()) {
        ctx.store.check_ready()?;
    }

    tracing::info!(candidates = resolved.len(), "Cleaning up orphaned assets");

    let entries: Vec<CleanupEntry> = stream::iter(resolved)
        .map(|(url, id)| clean_one(ctx, url, id))
        .buffered(ctx.concurrency.max(1))
        .collect()
        .await;

    Ok(ReconcileOutcome::Cleaned(entries))
}

async fn clean_one(ctx: &CleanupContext, url: String, id: Option<AssetId>) -> CleanupEntry {
    let Some(id) = id else {
        tracing::debug!(url = %url, "Not a store delivery URL, skipping");
        return CleanupEntry {
            url,
            public_id: None,
            status: CleanupStatus::Skipped,
        };
    };

    let result = match tokio::time::timeout(ctx.call_timeout, ctx.store.delete(&id)).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(ctx.call_timeout)),
    };

    let status = match result {
        Ok(response) => {
            tracing::info!(public_id = %id, "Orphaned asset deleted");
            CleanupStatus::Deleted { response }
        },
        Err(err) => {
            tracing::warn!(public_id = %id, error = %err, "Failed to delete orphaned asset");
            CleanupStatus::StoreError {
                error: err.to_string(),
            }
        },
    };

    CleanupEntry {
        url,
        public_id: Some(id),
        status,
    }
}

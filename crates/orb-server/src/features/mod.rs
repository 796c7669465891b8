//! Feature modules implementing the media API
//!
//! Each feature is a vertical slice with its own commands and routes.
//!
//! # Features
//!
//! - **cleanup**: webhook that deletes assets orphaned by database changes
//! - **uploads**: gateway that forwards client uploads to the media store

pub mod cleanup;
pub mod uploads;

use axum::Router;
use orb_common::AssetResolver;
use std::{sync::Arc, time::Duration};

use crate::config::Config;
use crate::storage::AssetStore;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// External media store
    pub store: Arc<dyn AssetStore>,
    pub cleanup: cleanup::CleanupContext,
    pub uploads: uploads::UploadContext,
}

impl FeatureState {
    pub fn new(config: &Config, store: Arc<dyn AssetStore>) -> Self {
        let cleanup = cleanup::CleanupContext {
            store: store.clone(),
            resolver: AssetResolver::new(config.store.delivery_marker.clone()),
            field_map: Arc::new(config.cleanup.field_map.clone()),
            concurrency: config.cleanup.concurrency,
            call_timeout: Duration::from_secs(config.store.timeout_secs),
        };

        let uploads = uploads::UploadContext {
            store: store.clone(),
            folder_root: config.media.folder_root.clone(),
        };

        Self {
            store,
            cleanup,
            uploads,
        }
    }
}

/// Creates the API router with all feature routes mounted under `/media`:
/// - `POST /media/cleanup` - database change webhook
/// - `POST /media/upload` - multipart upload gateway
pub fn router(state: FeatureState) -> Router<()> {
    let media = Router::new()
        .merge(cleanup::cleanup_routes().with_state(state.cleanup))
        .merge(uploads::upload_routes().with_state(state.uploads));

    Router::new().nest("/media", media)
}

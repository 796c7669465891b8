//! Shared helpers for media server integration tests
//!
//! Every test gets its own wiremock server standing in for the Cloudinary
//! admin and upload APIs, and a full application router pointed at it.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use orb_server::{
    api::create_router,
    config::Config,
    features::FeatureState,
    storage::{config::StoreConfig, AssetStore, CloudinaryStore},
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::MockServer;

/// Cloud name used by `StoreConfig::for_endpoint`
pub const CLOUD: &str = "orbfood";

/// Path the store's bulk delete endpoint is served on
pub const DELETE_PATH: &str = "/orbfood/resources/image/upload";

pub struct TestApp {
    pub router: Router,
    pub store: MockServer,
}

impl TestApp {
    /// Application with default config, talking to a fresh mock store.
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    pub async fn start_with(customize: impl FnOnce(&mut Config)) -> Self {
        let store = MockServer::start().await;

        let mut config = Config::default();
        config.store = StoreConfig::for_endpoint(store.uri());
        customize(&mut config);

        Self {
            router: build_router(&config),
            store,
        }
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        send(
            self.router.clone(),
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        send(
            self.router.clone(),
            Request::builder().uri(uri).body(Body::empty()).unwrap(),
        )
        .await
    }
}

pub fn build_router(config: &Config) -> Router {
    let store: Arc<dyn AssetStore> =
        Arc::new(CloudinaryStore::new(config.store.clone()).expect("store client"));
    create_router(FeatureState::new(config, store), &config.cors)
}

pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// Delivery URL as the store would hand it out.
pub fn delivery_url(public_id: &str) -> String {
    format!("https://res.cloudinary.com/{}/image/upload/v1712/{}.jpg", CLOUD, public_id)
}

pub mod response;

use crate::config::{Config, CorsConfig};
use crate::features::{self, FeatureState};
use crate::middleware;
use crate::storage::{AssetStore, CloudinaryStore};
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use std::{
    future::{Future, IntoFuture},
    net::SocketAddr,
    sync::Arc,
    time::Duration,
};
use tokio::{net::TcpListener, signal, sync::Notify};

/// Build the store from configuration and serve until a shutdown signal arrives.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store: Arc<dyn AssetStore> = Arc::new(CloudinaryStore::new(config.store.clone())?);

    let app = create_router(FeatureState::new(&config, store), &config.cors);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve_until(
        listener,
        app,
        shutdown_signal(),
        Duration::from_secs(config.server.shutdown_timeout_secs),
    )
    .await
}

/// Serve `app` until `signal` resolves.
///
/// New connections stop being accepted as soon as `signal` fires. In-flight
/// requests then get at most `grace` to finish before the server returns anyway.
pub async fn serve_until<F>(
    listener: TcpListener,
    app: Router,
    signal: F,
    grace: Duration,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let draining = Arc::new(Notify::new());
    let notify = draining.clone();

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            signal.await;
            notify.notify_one();
        })
        .into_future();

    let deadline = async move {
        draining.notified().await;
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = server => {
            result?;
            tracing::info!("Server shut down gracefully");
        },
        _ = deadline => {
            tracing::warn!(grace_secs = grace.as_secs(), "Shutdown deadline passed with requests still in flight");
        },
    }

    Ok(())
}

/// Create the application router with all routes and middleware
pub fn create_router(state: FeatureState, cors: &CorsConfig) -> Router {
    let store = state.store.clone();

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .with_state(store)
        .nest("/api/v1", features::router(state))
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(cors))
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "OrbFood Media Server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

/// Liveness plus whether the media store can accept calls.
async fn health(State(store): State<Arc<dyn AssetStore>>) -> impl IntoResponse {
    let store_status = match store.check_ready() {
        Ok(()) => "configured",
        Err(e) => {
            tracing::debug!(error = %e, "Store not ready");
            "unconfigured"
        },
    };

    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "store": store_status
        })),
    )
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, starting graceful shutdown");
        },
    }
}

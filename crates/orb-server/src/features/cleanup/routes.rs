use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};

use crate::api::response::{MessageResponse, ResultsResponse};
use crate::error::AppError;

use super::{
    commands::{reconcile, CleanupContext, ReconcileCommand, ReconcileOutcome},
    normalize::ChangeNotification,
};

pub fn cleanup_routes() -> Router<CleanupContext> {
    Router::new().route("/cleanup", post(cleanup_webhook))
}

/// Database change webhook.
///
/// The body is parsed by hand so that malformed payloads get the same
/// `{ "error": ... }` shape as every other failure.
async fn cleanup_webhook(
    State(ctx): State<CleanupContext>,
    body: Bytes,
) -> Result<Response, AppError> {
    let notification: ChangeNotification = serde_json::from_slice(&body)
        .map_err(|e| AppError::bad_request(format!("Invalid change notification: {}", e)))?;

    tracing::info!(
        table = %notification.table,
        change = %notification.change,
        "Image cleanup webhook triggered"
    );

    let outcome = reconcile::handle(&ctx, ReconcileCommand { notification }).await?;

    let response = match outcome {
        ReconcileOutcome::Cleaned(results) => ResultsResponse::success(results).into_response(),
        other => MessageResponse::new(other.message().unwrap_or_default()).into_response(),
    };

    Ok(response)
}

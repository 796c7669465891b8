use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};

use crate::error::AppError;

use super::commands::{upload, UploadAssetCommand, UploadContext};

pub fn upload_routes() -> Router<UploadContext> {
    Router::new().route("/upload", post(upload_asset))
}

#[tracing::instrument(skip(ctx, multipart))]
async fn upload_asset(
    State(ctx): State<UploadContext>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut command = UploadAssetCommand {
        folder: None,
        filename: None,
        content_type: None,
        content: Vec::new(),
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("Failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                command.filename = field.file_name().map(str::to_string);
                command.content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::bad_request(format!("Failed to read file bytes: {}", e)))?;
                command.content = data.to_vec();
            },
            "folder" => {
                let folder = field
                    .text()
                    .await
                    .map_err(|e| AppError::bad_request(format!("Failed to read folder: {}", e)))?;
                command.folder = Some(folder);
            },
            _ => {},
        }
    }

    let response = upload::handle(&ctx, command).await?;

    tracing::info!(secure_url = %response.secure_url, "Asset uploaded via API");

    Ok((StatusCode::OK, Json(response)).into_response())
}

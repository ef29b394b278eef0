//! Photo routes - pass-through to the configured [`PhotoStore`](crate::media::PhotoStore).

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::media::{PhotoUpload, MAX_PHOTO_BYTES};
use crate::AppState;

/// Deletion confirmation.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub result: String,
}

/// Create photo routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Uploads name the file, deletes name the stored id
        .route("/photos/{key}", post(upload_handler).delete(delete_handler))
        .layer(DefaultBodyLimit::max(MAX_PHOTO_BYTES))
}

/// POST /photos/{name} - Raw image bytes in the body.
async fn upload_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<PhotoUpload>> {
    state
        .photos
        .store(body, &name)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::BadRequest("empty upload".into()))
}

/// DELETE /photos/{id}
async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state
        .photos
        .delete(&id)
        .await?
        .map(|result| Json(DeleteResponse { result }))
        .ok_or_else(|| AppError::NotFound(format!("photo {}", id)))
}

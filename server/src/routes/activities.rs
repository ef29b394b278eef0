//! Activity routes.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use gather_engine::{Activity, PageRequest};

use crate::error::{AppError, Result};
use crate::handlers;
use crate::AppState;

/// Response header carrying the page metadata as JSON.
pub const PAGINATION: HeaderName = HeaderName::from_static("pagination");

/// Create activity routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/activities", get(list_handler).post(create_handler))
        .route(
            "/activities/{id}",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
}

/// GET /activities - One page of activities, metadata in the `Pagination` header.
async fn list_handler(
    State(state): State<AppState>,
    Query(request): Query<PageRequest>,
) -> Result<(HeaderMap, Json<Vec<Activity>>)> {
    let page = handlers::list_activities(&state.pool, request).await?;

    let header = serde_json::to_string(&page.header())
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let value = HeaderValue::from_str(&header).map_err(|e| AppError::Internal(e.to_string()))?;

    let mut headers = HeaderMap::new();
    headers.insert(PAGINATION, value);

    Ok((headers, Json(page.into_items())))
}

/// GET /activities/{id}
async fn get_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Activity>> {
    let activity = handlers::get_activity(&state.pool, &id).await?;
    Ok(Json(activity))
}

/// POST /activities
async fn create_handler(
    State(state): State<AppState>,
    Json(activity): Json<Activity>,
) -> Result<StatusCode> {
    handlers::create_activity(&state.pool, activity).await?;
    Ok(StatusCode::CREATED)
}

/// PUT /activities/{id}
async fn update_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(activity): Json<Activity>,
) -> Result<StatusCode> {
    handlers::update_activity(&state.pool, &id, activity).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /activities/{id}
async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    handlers::delete_activity(&state.pool, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

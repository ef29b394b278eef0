//! HTTP route definitions.

mod activities;
mod health;
mod photos;

pub use activities::PAGINATION;

use crate::AppState;
use axum::Router;

/// Create all application routes.
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(activities::routes())
        .merge(photos::routes())
}

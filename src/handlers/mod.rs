pub mod pages;
pub mod predict;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/", get(pages::home))
        .route("/static/{*path}", get(pages::static_file))
        .route("/predict", post(predict::predict))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

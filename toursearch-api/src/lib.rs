use axum::{http::Uri, routing::get, Router};
use tower_http::trace::TraceLayer;

pub mod error;
pub mod state;
pub mod tours;
pub mod views;

pub use state::AppState;

use crate::error::AppError;

pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(tours::routes())
        .route("/health", get(health))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFoundError(format!("No route for {}", uri.path()))
}

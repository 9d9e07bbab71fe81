//! API endpoints.

mod auth;
pub mod health;
mod notices;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router, to be nested under `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/notices", notices::router())
}

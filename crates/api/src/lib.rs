//! HTTP API layer for noticeboard.
//!
//! - **Endpoints**: notice CRUD, registration and login, health check
//! - **Extractors**: bearer-token callers and read access
//! - **Middleware**: token verification
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

use axum::{Router, middleware::from_fn_with_state};

pub use endpoints::router;
pub use middleware::AppState;

/// Full application: `/api` routes behind the auth middleware plus
/// `/health`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", router())
        .merge(endpoints::health::router())
        .layer(from_fn_with_state(state.clone(), middleware::auth_middleware))
        .with_state(state)
}

//! Authentication endpoints.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use noticeboard_common::AppResult;
use noticeboard_core::{AuthSession, LoginInput, RegisterInput};

use crate::middleware::AppState;

/// Create auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Register a new account.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterInput>,
) -> AppResult<(StatusCode, Json<AuthSession>)> {
    let session = state.account_service.register(req).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// Log in with email and password.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginInput>,
) -> AppResult<Json<AuthSession>> {
    let session = state.account_service.login(req).await?;
    Ok(Json(session))
}

//! API middleware.

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use noticeboard_core::{AccountService, NoticeService, TokenService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub notice_service: NoticeService,
    pub account_service: AccountService,
    pub token_service: TokenService,
    /// Whether notice reads need a bearer token.
    pub require_auth_for_reads: bool,
}

/// Authentication middleware.
///
/// Verifies a `Bearer` token when present and stores its claims in the
/// request extensions. Requests without a valid token pass through
/// anonymously; extractors decide whether that is acceptable.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    if let Some(token) = token {
        if let Ok(claims) = state.token_service.verify(token) {
            req.extensions_mut().insert(claims);
        }
    }

    next.run(req).await
}

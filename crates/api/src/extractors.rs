//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use noticeboard_common::AppError;
use noticeboard_core::Claims;

use crate::middleware::AppState;

/// Authenticated caller extractor.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Fail with `Forbidden` unless the caller is an admin.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.0.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Admin access required".to_string()))
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Claims are set by the auth middleware
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// Caller of a notice read endpoint.
///
/// Anonymous callers are let through only when the deployment does not
/// require authentication for reads.
#[derive(Debug, Clone)]
pub struct Reader(pub Option<Claims>);

impl Reader {
    /// Whether the caller may see unpublished notices.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.0.as_ref().is_some_and(Claims::is_admin)
    }
}

impl FromRequestParts<AppState> for Reader {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = parts.extensions.get::<Claims>().cloned();

        if claims.is_none() && state.require_auth_for_reads {
            return Err(AppError::Unauthorized);
        }

        Ok(Self(claims))
    }
}

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use super::jwt::JwtKeys;
use crate::error::{AppError, AuthFailure};

/// Extracts and validates the bearer access token, yielding the caller's id.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AppError::Auth(AuthFailure::NotAuthenticated))?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or(AppError::Auth(AuthFailure::TokenInvalid))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify_access(token.trim()).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            AppError::Auth(AuthFailure::TokenInvalid)
        })?;

        Ok(AuthUser(claims.sub))
    }
}

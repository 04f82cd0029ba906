use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

use super::services::JwtKeys;
use crate::error::AppError;

/// Identity resolved from the bearer token of a protected request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// `Authorization: Bearer <t>`, or the bare `token` header older clients send.
/// An empty bearer value falls through to `token`.
fn token_from_parts(parts: &Parts) -> Option<&str> {
    let bearer = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(|auth| {
            let auth = auth.trim();
            if auth.eq_ignore_ascii_case("bearer") {
                return "";
            }
            auth.strip_prefix("Bearer ")
                .or_else(|| auth.strip_prefix("bearer "))
                .unwrap_or(auth)
                .trim()
        })
        .filter(|t| !t.is_empty());

    bearer.or_else(|| {
        parts
            .headers
            .get("token")
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|t| !t.is_empty())
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts).ok_or_else(|| {
            AppError::Unauthorized("Not Authorized. Please login again.".into())
        })?;

        let claims = JwtKeys::from_ref(state).verify(token)?;
        Ok(AuthUser {
            id: claims.sub,
            email: claims.email,
        })
    }
}

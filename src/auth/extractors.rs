use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::token::{TokenError, TokenIssuer};
use crate::error::AppError;

/// Extracts and validates the bearer token, yielding the subject (the user's email).
pub struct AuthUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<TokenIssuer>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = Arc::<TokenIssuer>::from_ref(state);

        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| {
                warn!("missing Authorization header");
                AppError::InvalidToken
            })?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or_else(|| {
                warn!("invalid auth scheme");
                AppError::InvalidToken
            })?;

        let claims = tokens.verify(token.trim()).map_err(|e| {
            match e {
                TokenError::Expired => warn!("expired token"),
                TokenError::Malformed(ref err) => warn!(error = %err, "invalid token"),
            }
            AppError::from(e)
        })?;

        let sub = claims.subject().ok_or_else(|| {
            warn!("token without subject");
            AppError::InvalidToken
        })?;

        Ok(AuthUser(sub.to_string()))
    }
}

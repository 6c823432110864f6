//! Boundary-level identity extraction.
//!
//! Authentication proper (token issuance, verification) lives in an
//! external collaborator; this API accepts an opaque bearer token that
//! carries the caller's user id.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use std::convert::Infallible;
use uuid::Uuid;

use crate::utils::error::AppError;

fn bearer_user(parts: &Parts) -> Option<Uuid> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    Uuid::parse_str(token).ok()
}

/// Required identity; rejects with 401 when absent or malformed.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        bearer_user(parts)
            .map(AuthUser)
            .ok_or_else(|| AppError::Auth("missing or malformed bearer token".to_string()))
    }
}

/// Optional identity for read paths that personalize (the per-viewer
/// star flag) but stay public.
#[derive(Debug, Clone, Copy)]
pub struct MaybeAuthUser(pub Option<Uuid>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for MaybeAuthUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(bearer_user(parts)))
    }
}

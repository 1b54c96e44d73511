//! Acting-user extraction
//!
//! Authentication happens upstream; the gateway forwards the authenticated
//! user's id in the `x-user-id` header.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::AppError;

/// Header carrying the authenticated user's id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor for the acting user
/// Use this in handlers that record who performed an action
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurrentUser(pub Uuid);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        raw.to_str()
            .ok()
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized("Invalid user id header".to_string()))
    }
}

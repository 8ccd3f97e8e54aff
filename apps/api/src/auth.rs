//! Caller identity. The upstream auth proxy forwards the signed-in user's
//! opaque id in `x-user-id`; this service never inspects it further.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::errors::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated user's opaque id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| CurrentUser(v.to_string()))
            .ok_or(AppError::Unauthorized)
    }
}

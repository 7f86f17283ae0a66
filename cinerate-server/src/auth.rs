//! Principal extraction.
//!
//! Authentication mechanics (tokens, sessions) live in an upstream layer
//! that injects identity headers on every request it lets through. Handlers
//! that need an authenticated principal extract one here; a request without
//! the headers is rejected before any core logic runs.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::infra::errors::ApiError;
use cinerate_model::UserId;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Authenticated principal as supplied by the upstream auth layer.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: UserId,
    pub name: String,
    pub role: String,
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };

        let id = header(USER_ID_HEADER)
            .and_then(|raw| raw.parse::<Uuid>().ok())
            .map(UserId::from)
            .ok_or_else(|| ApiError::unauthorized("authentication required"))?;
        let name = header(USER_NAME_HEADER)
            .ok_or_else(|| ApiError::unauthorized("authentication required"))?;
        let role = header(USER_ROLE_HEADER).unwrap_or_else(|| "user".to_string());

        Ok(Principal { id, name, role })
    }
}

//! Bearer-token extraction.
//!
//! Mutation endpoints accept anonymous requests and let the service's
//! authorization policy reject them with 403, so the extractor yields an
//! `Option`: a missing Authorization header is an anonymous caller, while
//! a malformed header or invalid token is a 401.

use axum::{async_trait, extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};

use crate::api::AppState;
use crate::config::BEARER_TOKEN_PREFIX;
use crate::domain::Requester;
use crate::errors::AppError;

/// Optionally authenticated caller extracted from the Authorization header.
pub struct MaybeUser(pub Option<Requester>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(auth_header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(MaybeUser(None));
        };

        let token = auth_header
            .to_str()
            .ok()
            .and_then(|h| h.strip_prefix(BEARER_TOKEN_PREFIX))
            .ok_or(AppError::Unauthorized)?;

        let requester = state.auth_service.authenticate(token)?;

        Ok(MaybeUser(Some(requester)))
    }
}

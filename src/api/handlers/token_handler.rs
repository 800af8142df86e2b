//! JWT token handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::errors::AppResult;
use crate::services::{AccessToken, TokenPair};

/// Credential check request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TokenRequest {
    /// Account username
    #[validate(length(min = 1, message = "This field may not be blank."))]
    #[schema(example = "jdoe")]
    pub username: String,
    /// Account password
    #[validate(length(min = 1, message = "This field may not be blank."))]
    #[schema(example = "StrongP@ssw0rd123")]
    pub password: String,
}

/// Token refresh request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RefreshRequest {
    /// Refresh token from a previously issued pair
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub refresh: String,
}

/// Token verification request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyRequest {
    /// Access or refresh token to check
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub token: String,
}

/// Create token routes
pub fn token_routes() -> Router<AppState> {
    Router::new()
        .route("/token", post(obtain_pair))
        .route("/token/refresh", post(refresh))
        .route("/token/verify", post(verify))
}

/// Obtain an access/refresh token pair
#[utoipa::path(
    post,
    path = "/token",
    tag = "Tokens",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token pair issued", body = TokenPair),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn obtain_pair(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<TokenRequest>,
) -> AppResult<Json<TokenPair>> {
    let pair = state
        .auth_service
        .obtain_pair(&payload.username, &payload.password)
        .await?;

    Ok(Json(pair))
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/token/refresh",
    tag = "Tokens",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token issued", body = AccessToken),
        (status = 401, description = "Invalid or expired refresh token")
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RefreshRequest>,
) -> AppResult<Json<AccessToken>> {
    let access = state.auth_service.refresh_access(&payload.refresh)?;
    Ok(Json(access))
}

/// Verify a token's signature and expiry
#[utoipa::path(
    post,
    path = "/token/verify",
    tag = "Tokens",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Token is valid"),
        (status = 401, description = "Invalid or expired token")
    )
)]
pub async fn verify(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<VerifyRequest>,
) -> AppResult<StatusCode> {
    state.auth_service.verify(&payload.token)?;
    Ok(StatusCode::OK)
}

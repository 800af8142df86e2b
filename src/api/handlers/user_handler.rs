//! User account handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::{MaybeUser, ValidatedJson};
use crate::api::AppState;
use crate::domain::{NewUser, UserChanges, UserView};
use crate::errors::AppResult;

/// User registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Desired username (letters, digits and @/./+/-/_)
    #[validate(length(min = 1, message = "This field may not be blank."))]
    #[schema(example = "jdoe")]
    pub username: String,
    /// User email address
    #[validate(email(message = "Enter a valid email address."))]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// Password satisfying the strength policy
    #[schema(example = "StrongP@ssw0rd123", min_length = 8)]
    pub password: String,
    /// Staff privilege flag (defaults to false)
    #[serde(default)]
    pub is_staff: bool,
}

/// Partial account update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    /// New username
    #[schema(example = "jdoe2")]
    pub username: Option<String>,
    /// New email address
    #[validate(email(message = "Enter a valid email address."))]
    #[schema(example = "new@example.com")]
    pub email: Option<String>,
    /// New password satisfying the strength policy
    #[schema(min_length = 8)]
    pub password: Option<String>,
    /// New staff privilege flag
    pub is_staff: Option<bool>,
}

/// Password reset request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    /// Email address of the account to reset
    #[validate(email(message = "Enter a valid email address."))]
    #[schema(example = "user@example.com")]
    pub email: String,
}

/// Password reset confirmation
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ConfirmResetRequest {
    /// Replacement password satisfying the strength policy
    #[schema(min_length = 8)]
    pub new_password: String,
}

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user", post(register))
        .route(
            "/user/:id",
            get(get_user)
                .put(update_user)
                .patch(update_user)
                .delete(delete_user),
        )
        .route("/user/reset-password", post(request_password_reset))
        .route("/user/reset-password/:id/:token", post(confirm_password_reset))
        .route("/users", get(list_users))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/user",
    tag = "Users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = UserView),
        (status = 400, description = "Validation error with per-field reasons")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserView>)> {
    let user = state
        .user_service
        .register(NewUser {
            username: payload.username,
            email: payload.email,
            password: payload.password,
            is_staff: payload.is_staff,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserView::from(user))))
}

/// Get user by ID (public)
#[utoipa::path(
    get,
    path = "/user/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User profile", body = UserView),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserView>> {
    let user = state.user_service.get_user(id).await?;
    Ok(Json(UserView::from(user)))
}

/// List all users (public)
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    responses(
        (status = 200, description = "List of all users", body = Vec<UserView>)
    )
)]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserView>>> {
    let users = state.user_service.list_users().await?;
    Ok(Json(users.into_iter().map(UserView::from).collect()))
}

/// Update user (owner or staff)
#[utoipa::path(
    put,
    path = "/user/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = UserView),
        (status = 400, description = "Validation error with per-field reasons"),
        (status = 403, description = "Forbidden - only the owner or staff may update"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    MaybeUser(requester): MaybeUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Json<UserView>> {
    let user = state
        .user_service
        .update_user(
            id,
            UserChanges {
                username: payload.username,
                email: payload.email,
                password: payload.password,
                is_staff: payload.is_staff,
            },
            requester,
        )
        .await?;

    Ok(Json(UserView::from(user)))
}

/// Delete user (owner or staff)
#[utoipa::path(
    delete,
    path = "/user/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted successfully"),
        (status = 403, description = "Forbidden - only the owner or staff may delete"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    MaybeUser(requester): MaybeUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.user_service.delete_user(id, requester).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Request a password-reset email
#[utoipa::path(
    post,
    path = "/user/reset-password",
    tag = "Users",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Reset email sent"),
        (status = 400, description = "Unknown email or validation error")
    )
)]
pub async fn request_password_reset(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ResetPasswordRequest>,
) -> AppResult<StatusCode> {
    state
        .user_service
        .request_password_reset(&payload.email)
        .await?;
    Ok(StatusCode::OK)
}

/// Complete a password reset using an emailed token
#[utoipa::path(
    post,
    path = "/user/reset-password/{id}/{token}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID"),
        ("token" = String, Path, description = "Reset token from the emailed link")
    ),
    request_body = ConfirmResetRequest,
    responses(
        (status = 200, description = "Password updated"),
        (status = 400, description = "Invalid token or rejected password"),
        (status = 404, description = "User not found")
    )
)]
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Path((id, token)): Path<(Uuid, String)>,
    ValidatedJson(payload): ValidatedJson<ConfirmResetRequest>,
) -> AppResult<StatusCode> {
    state
        .user_service
        .confirm_password_reset(id, &token, &payload.new_password)
        .await?;
    Ok(StatusCode::OK)
}

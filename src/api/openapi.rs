//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{token_handler, user_handler};
use crate::domain::UserView;
use crate::services::{AccessToken, TokenPair};

/// OpenAPI documentation for the accounts API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Accounts API",
        version = "0.1.0",
        description = "User-account backend with JWT authentication and password reset"
    ),
    paths(
        // User endpoints
        user_handler::register,
        user_handler::get_user,
        user_handler::list_users,
        user_handler::update_user,
        user_handler::delete_user,
        user_handler::request_password_reset,
        user_handler::confirm_password_reset,
        // Token endpoints
        token_handler::obtain_pair,
        token_handler::refresh,
        token_handler::verify,
    ),
    components(
        schemas(
            // Domain types
            UserView,
            // User handler types
            user_handler::RegisterRequest,
            user_handler::UpdateUserRequest,
            user_handler::ResetPasswordRequest,
            user_handler::ConfirmResetRequest,
            // Token types
            token_handler::TokenRequest,
            token_handler::RefreshRequest,
            token_handler::VerifyRequest,
            TokenPair,
            AccessToken,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Users", description = "Account registration and management"),
        (name = "Tokens", description = "JWT token lifecycle")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT access token obtained from /token"))
                        .build(),
                ),
            );
        }
    }
}

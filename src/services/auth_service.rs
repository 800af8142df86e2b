//! Authentication service - JWT token lifecycle.
//!
//! Issues stateless access/refresh token pairs against stored credentials
//! and verifies presented tokens. Refresh tokens are non-rotating: a
//! refresh yields a fresh access token only.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, TOKEN_KIND_ACCESS, TOKEN_KIND_REFRESH};
use crate::domain::{Password, Requester, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UserRepository;

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub is_staff: bool,
    /// Token kind: "access" or "refresh"
    pub kind: String,
    /// Unique token id; guarantees distinct tokens per issuance
    pub jti: String,
    pub exp: i64,
    pub iat: i64,
}

/// Access/refresh pair returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenPair {
    /// Short-lived JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access: String,
    /// Longer-lived JWT refresh token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub refresh: String,
}

/// Fresh access token returned by the refresh endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct AccessToken {
    /// Short-lived JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access: String,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Check credentials and issue an access/refresh pair
    async fn obtain_pair(&self, username: &str, password: &str) -> AppResult<TokenPair>;

    /// Exchange a valid refresh token for a new access token
    fn refresh_access(&self, refresh_token: &str) -> AppResult<AccessToken>;

    /// Verify signature and expiry of either token kind
    fn verify(&self, token: &str) -> AppResult<Claims>;

    /// Verify an access token and extract the caller identity
    fn authenticate(&self, token: &str) -> AppResult<Requester>;
}

/// Concrete implementation of AuthService backed by the user repository.
pub struct Authenticator {
    repo: Arc<dyn UserRepository>,
    config: Config,
}

impl Authenticator {
    pub fn new(repo: Arc<dyn UserRepository>, config: Config) -> Self {
        Self { repo, config }
    }

    fn issue(&self, user: &User, kind: &str, lifetime_minutes: i64) -> AppResult<String> {
        let now = Utc::now();
        let expires_at = now + Duration::minutes(lifetime_minutes);

        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            is_staff: user.is_staff,
            kind: kind.to_string(),
            jti: Uuid::new_v4().simple().to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret_bytes()),
        )?;

        Ok(token)
    }

    fn decode(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret_bytes()),
            &validation,
        )?;

        Ok(token_data.claims)
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn obtain_pair(&self, username: &str, password: &str) -> AppResult<TokenPair> {
        let user_result = self.repo.find_by_username(username).await?;

        // SECURITY: Perform password verification even if user doesn't exist
        // to prevent timing attacks that could enumerate valid usernames.
        // We use a dummy hash that will always fail verification.
        let dummy_hash = "$argon2id$v=19$m=19456,t=2,p=1$dummysalt123456$dummyhash1234567890123456789012";

        let (password_hash, user_exists) = match &user_result {
            Some(user) => (user.password_hash.as_str(), true),
            None => (dummy_hash, false),
        };

        let stored_password = Password::from_hash(password_hash.to_string());
        let password_valid = stored_password.verify(password);

        // Only succeed if both user exists AND password is valid
        if !user_exists || !password_valid {
            return Err(AppError::InvalidCredentials);
        }

        // Safe to unwrap since we verified user_exists is true
        let user = user_result.as_ref().unwrap();

        Ok(TokenPair {
            access: self.issue(user, TOKEN_KIND_ACCESS, self.config.access_token_minutes)?,
            refresh: self.issue(user, TOKEN_KIND_REFRESH, self.config.refresh_token_minutes)?,
        })
    }

    fn refresh_access(&self, refresh_token: &str) -> AppResult<AccessToken> {
        let claims = self.decode(refresh_token)?;
        if claims.kind != TOKEN_KIND_REFRESH {
            return Err(AppError::Unauthorized);
        }

        let now = Utc::now();
        let expires_at = now + Duration::minutes(self.config.access_token_minutes);

        let access_claims = Claims {
            sub: claims.sub,
            username: claims.username,
            is_staff: claims.is_staff,
            kind: TOKEN_KIND_ACCESS.to_string(),
            jti: Uuid::new_v4().simple().to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let access = encode(
            &Header::default(),
            &access_claims,
            &EncodingKey::from_secret(self.config.jwt_secret_bytes()),
        )?;

        Ok(AccessToken { access })
    }

    fn verify(&self, token: &str) -> AppResult<Claims> {
        self.decode(token)
    }

    fn authenticate(&self, token: &str) -> AppResult<Requester> {
        let claims = self.decode(token)?;
        if claims.kind != TOKEN_KIND_ACCESS {
            return Err(AppError::Unauthorized);
        }

        Ok(Requester {
            id: claims.sub,
            is_staff: claims.is_staff,
        })
    }
}

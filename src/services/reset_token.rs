//! Password-reset token issuer.
//!
//! Tokens are short JWTs signed with a key derived from the application
//! secret and the account's current password hash. That binds each token
//! to a single account and its credential state: changing the password
//! changes the signing key, so every outstanding reset token for the
//! account stops verifying without any server-side bookkeeping.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{Config, TOKEN_KIND_RESET};
use crate::domain::User;
use crate::errors::{AppError, AppResult};

#[derive(Debug, Serialize, Deserialize)]
struct ResetClaims {
    sub: Uuid,
    kind: String,
    exp: i64,
    iat: i64,
}

/// Issues and checks account-bound, time-limited reset tokens.
#[derive(Clone)]
pub struct ResetTokenIssuer {
    secret: String,
    lifetime_minutes: i64,
    base_url: String,
}

impl ResetTokenIssuer {
    pub fn new(secret: String, lifetime_minutes: i64, base_url: String) -> Self {
        Self {
            secret,
            lifetime_minutes,
            base_url,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.jwt_secret().to_string(),
            config.reset_token_minutes,
            config.public_base_url.clone(),
        )
    }

    /// Per-account signing key: application secret concatenated with the
    /// current password hash.
    fn signing_key(&self, user: &User) -> Vec<u8> {
        let mut key = self.secret.clone().into_bytes();
        key.extend_from_slice(user.password_hash.as_bytes());
        key
    }

    /// Issue a reset token for the account's current credential state.
    pub fn issue(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let claims = ResetClaims {
            sub: user.id,
            kind: TOKEN_KIND_RESET.to_string(),
            exp: (now + Duration::minutes(self.lifetime_minutes)).timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(&self.signing_key(user)),
        )?;

        Ok(token)
    }

    /// Check a token against the account it claims to reset.
    pub fn verify(&self, user: &User, token: &str) -> AppResult<()> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let data = decode::<ResetClaims>(
            token,
            &DecodingKey::from_secret(&self.signing_key(user)),
            &validation,
        )?;

        if data.claims.sub != user.id || data.claims.kind != TOKEN_KIND_RESET {
            return Err(AppError::Unauthorized);
        }

        Ok(())
    }

    /// Callback URL embedded in the reset email.
    pub fn reset_url(&self, user: &User, token: &str) -> String {
        format!(
            "{}/user/reset-password/{}/{}",
            self.base_url.trim_end_matches('/'),
            user.id,
            token
        )
    }
}

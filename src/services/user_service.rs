//! User service - the single authority over account mutation.
//!
//! Orchestrates validation, authorization and persistence for every
//! account operation. Authorization is enforced here, not in handlers,
//! so update and delete cannot drift apart.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;
use validator::ValidateEmail;

use crate::domain::{
    mutation_allowed, validate_username, NewUser, Password, PasswordPolicy, Requester, User,
    UserChanges,
};
use crate::errors::{AppError, AppResult, FieldErrors, OptionExt};
use crate::infra::{UserPatch, UserRepository};
use crate::services::notifier::Notifier;
use crate::services::reset_token::ResetTokenIssuer;

const EMAIL_INVALID: &str = "Enter a valid email address.";
const USERNAME_TAKEN: &str = "A user with that username already exists.";
const EMAIL_UNKNOWN: &str = "No account found with this email address.";
const RESET_TOKEN_INVALID: &str = "Invalid or expired reset token.";

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Register a new account; no authentication required
    async fn register(&self, new_user: NewUser) -> AppResult<User>;

    /// Get user by ID (public)
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// List all users (public)
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Update account fields; only the owner or staff may mutate
    async fn update_user(
        &self,
        id: Uuid,
        changes: UserChanges,
        requester: Option<Requester>,
    ) -> AppResult<User>;

    /// Permanently delete an account; only the owner or staff may mutate
    async fn delete_user(&self, id: Uuid, requester: Option<Requester>) -> AppResult<()>;

    /// Email a single-use reset link to the account registered under `email`
    async fn request_password_reset(&self, email: &str) -> AppResult<()>;

    /// Complete a reset started by [`UserService::request_password_reset`]
    async fn confirm_password_reset(
        &self,
        id: Uuid,
        token: &str,
        new_password: &str,
    ) -> AppResult<()>;
}

/// Concrete implementation of UserService.
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
    notifier: Arc<dyn Notifier>,
    reset_tokens: ResetTokenIssuer,
    policy: PasswordPolicy,
}

impl UserManager {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        notifier: Arc<dyn Notifier>,
        reset_tokens: ResetTokenIssuer,
    ) -> Self {
        Self {
            repo,
            notifier,
            reset_tokens,
            policy: PasswordPolicy::default(),
        }
    }

    /// Run the password policy with the account's identity attributes as
    /// similarity hints, recording violations under `field`.
    fn check_password_policy(
        &self,
        errors: &mut FieldErrors,
        field: &str,
        password: &str,
        username: &str,
        email: &str,
    ) {
        if let Err(reasons) = self
            .policy
            .validate(password, &[("username", username), ("email address", email)])
        {
            errors.extend_field(field, reasons);
        }
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn register(&self, new_user: NewUser) -> AppResult<User> {
        // Structural field validation first; the password policy only runs
        // once these pass.
        let mut errors = FieldErrors::new();

        match validate_username(&new_user.username) {
            Err(msg) => errors.push("username", msg),
            Ok(()) => {
                if self
                    .repo
                    .find_by_username(&new_user.username)
                    .await?
                    .is_some()
                {
                    errors.push("username", USERNAME_TAKEN);
                }
            }
        }

        if !new_user.email.validate_email() {
            errors.push("email", EMAIL_INVALID);
        }

        errors.into_result()?;

        let mut errors = FieldErrors::new();
        self.check_password_policy(
            &mut errors,
            "password",
            &new_user.password,
            &new_user.username,
            &new_user.email,
        );
        errors.into_result()?;

        let password_hash = Password::new(&new_user.password)?.into_string();

        // The store's unique constraint settles same-username races; a
        // violation here surfaces as the duplicate-username field error.
        self.repo
            .create(
                new_user.username,
                new_user.email,
                password_hash,
                new_user.is_staff,
            )
            .await
    }

    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.repo.find_by_id(id).await?.ok_or_not_found()
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.repo.list().await
    }

    async fn update_user(
        &self,
        id: Uuid,
        changes: UserChanges,
        requester: Option<Requester>,
    ) -> AppResult<User> {
        // Missing ids are 404 for every caller, staff and anonymous included
        let existing = self.repo.find_by_id(id).await?.ok_or_not_found()?;

        if !mutation_allowed(requester, id) {
            return Err(AppError::Forbidden);
        }

        let mut errors = FieldErrors::new();

        if let Some(username) = &changes.username {
            match validate_username(username) {
                Err(msg) => errors.push("username", msg),
                Ok(()) => {
                    if username != &existing.username
                        && self.repo.find_by_username(username).await?.is_some()
                    {
                        errors.push("username", USERNAME_TAKEN);
                    }
                }
            }
        }

        if let Some(email) = &changes.email {
            if !email.validate_email() {
                errors.push("email", EMAIL_INVALID);
            }
        }

        errors.into_result()?;

        let mut patch = UserPatch {
            username: changes.username.clone(),
            email: changes.email.clone(),
            password_hash: None,
            is_staff: changes.is_staff,
        };

        if let Some(password) = &changes.password {
            // Validate against the identity the account will have after
            // this update; nothing is written unless the policy passes.
            let username_hint = changes.username.as_deref().unwrap_or(&existing.username);
            let email_hint = changes.email.as_deref().unwrap_or(&existing.email);

            let mut errors = FieldErrors::new();
            self.check_password_policy(&mut errors, "password", password, username_hint, email_hint);
            errors.into_result()?;

            patch.password_hash = Some(Password::new(password)?.into_string());
        }

        self.repo.update(id, patch).await
    }

    async fn delete_user(&self, id: Uuid, requester: Option<Requester>) -> AppResult<()> {
        self.repo.find_by_id(id).await?.ok_or_not_found()?;

        if !mutation_allowed(requester, id) {
            return Err(AppError::Forbidden);
        }

        self.repo.delete(id).await
    }

    async fn request_password_reset(&self, email: &str) -> AppResult<()> {
        // Unknown emails are reported to the caller. This reveals account
        // existence; a documented trade-off of this API.
        let user = self
            .repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::validation("email", EMAIL_UNKNOWN))?;

        let token = self.reset_tokens.issue(&user)?;
        let url = self.reset_tokens.reset_url(&user, &token);
        let body = format!("Follow the link to reset your password: {}", url);

        // Fire-and-forget from the caller's perspective: delivery failures
        // are logged, never surfaced through the reset endpoint.
        if let Err(e) = self.notifier.send(&user.email, "Password reset", &body).await {
            tracing::error!(user_id = %user.id, "Failed to send password reset email: {}", e);
        }

        Ok(())
    }

    async fn confirm_password_reset(
        &self,
        id: Uuid,
        token: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = self.repo.find_by_id(id).await?.ok_or_not_found()?;

        self.reset_tokens
            .verify(&user, token)
            .map_err(|_| AppError::validation("token", RESET_TOKEN_INVALID))?;

        let mut errors = FieldErrors::new();
        self.check_password_policy(
            &mut errors,
            "new_password",
            new_password,
            &user.username,
            &user.email,
        );
        errors.into_result()?;

        let patch = UserPatch {
            password_hash: Some(Password::new(new_password)?.into_string()),
            ..UserPatch::default()
        };
        self.repo.update(id, patch).await?;

        Ok(())
    }
}

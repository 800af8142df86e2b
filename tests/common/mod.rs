//! Shared test fixtures: repository/notifier mocks and user builders.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use mockall::mock;
use std::sync::Arc;
use uuid::Uuid;

use accounts_api::config::Config;
use accounts_api::domain::{Password, User};
use accounts_api::errors::AppResult;
use accounts_api::infra::{UserPatch, UserRepository};
use accounts_api::services::{Notifier, ResetTokenIssuer, UserManager};

/// Password used by the standard test user fixture
pub const TEST_PASSWORD: &str = "StrongP@ssw0rd123";

mock! {
    pub UserRepo {}

    #[async_trait]
    impl UserRepository for UserRepo {
        async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
        async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
        async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
        async fn list(&self) -> AppResult<Vec<User>>;
        async fn create(
            &self,
            username: String,
            email: String,
            password_hash: String,
            is_staff: bool,
        ) -> AppResult<User>;
        async fn update(&self, id: Uuid, patch: UserPatch) -> AppResult<User>;
        async fn delete(&self, id: Uuid) -> AppResult<()>;
    }
}

mock! {
    pub Notif {}

    #[async_trait]
    impl Notifier for Notif {
        async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()>;
    }
}

/// Build a user with a fixed identity and a placeholder hash.
pub fn test_user(id: Uuid) -> User {
    User {
        id,
        username: "testuser".to_string(),
        email: "testuser@example.com".to_string(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$somesalt$somehash".to_string(),
        is_staff: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Build a user whose stored hash verifies [`TEST_PASSWORD`].
pub fn test_user_with_password(id: Uuid) -> User {
    let mut user = test_user(id);
    user.password_hash = Password::new(TEST_PASSWORD).unwrap().into_string();
    user
}

/// Build a staff user.
pub fn staff_user(id: Uuid) -> User {
    let mut user = test_user(id);
    user.username = "admin".to_string();
    user.email = "admin@example.com".to_string();
    user.is_staff = true;
    user
}

/// Reset-token issuer matching the default test config.
pub fn reset_issuer() -> ResetTokenIssuer {
    ResetTokenIssuer::from_config(&Config::default())
}

/// Wire a user service over the given mocks.
pub fn user_manager(repo: MockUserRepo, notifier: MockNotif) -> UserManager {
    UserManager::new(Arc::new(repo), Arc::new(notifier), reset_issuer())
}

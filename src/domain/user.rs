//! User domain entity and related types.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Valid username characters: letters, digits and `@ . + - _`
static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid regex"));

/// Validate the username format invariant.
///
/// Usernames must be non-empty and restricted to letters, digits and a
/// small punctuation allow-list.
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("This field may not be blank.".to_string());
    }
    if !USERNAME_RE.is_match(username) {
        return Err(
            "Enter a valid username. This value may contain only letters, numbers, \
             and @/./+/-/_ characters."
                .to_string(),
        );
    }
    Ok(())
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Elevated-privilege flag: staff may mutate any account
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Authenticated caller identity extracted from a verified access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    pub id: Uuid,
    pub is_staff: bool,
}

impl Requester {
    /// Ownership rule shared by update and delete: the account owner or
    /// any staff account may mutate a record.
    pub fn may_modify(&self, target: Uuid) -> bool {
        self.id == target || self.is_staff
    }
}

/// The single mutation-authorization predicate. Anonymous callers are
/// never allowed.
pub fn mutation_allowed(requester: Option<Requester>, target: Uuid) -> bool {
    requester.is_some_and(|r| r.may_modify(target))
}

/// Registration data
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub is_staff: bool,
}

/// Partial account update; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub is_staff: Option<bool>,
}

/// Public user view (safe to return to any caller)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserView {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    /// Unique username
    #[schema(example = "jdoe")]
    pub username: String,
    /// User email address
    #[schema(example = "user@example.com")]
    pub email: String,
    /// Staff privilege flag
    pub is_staff: bool,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_staff: user.is_staff,
        }
    }
}

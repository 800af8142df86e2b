//! Domain layer - Core business entities and logic
//!
//! This module contains the core domain models that represent
//! business concepts independent of infrastructure concerns.

pub mod password;
pub mod password_policy;
pub mod user;

pub use password::Password;
pub use password_policy::PasswordPolicy;
pub use user::{
    mutation_allowed, validate_username, NewUser, Requester, User, UserChanges, UserView,
};

//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections and repositories
//! - Schema migrations

pub mod db;
pub mod repositories;

pub use db::{Database, Migrator};
pub use repositories::{UserPatch, UserRepository, UserStore};

//! Application state - Dependency injection container.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::Config;
use crate::services::{AuthService, Services, UserService};

/// Application state containing all services.
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// User service
    pub user_service: Arc<dyn UserService>,
}

impl AppState {
    /// Create application state from a database connection and config.
    pub fn from_config(db: DatabaseConnection, config: Config) -> Self {
        let services = Services::from_connection(db, config);
        Self {
            auth_service: services.auth(),
            user_service: services.users(),
        }
    }

    /// Create application state with manually injected services (tests).
    pub fn new(auth_service: Arc<dyn AuthService>, user_service: Arc<dyn UserService>) -> Self {
        Self {
            auth_service,
            user_service,
        }
    }
}

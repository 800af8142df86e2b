//! Service container - wires repositories and collaborators into services.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::notifier::{LogNotifier, Notifier, SmtpNotifier};
use super::reset_token::ResetTokenIssuer;
use super::{AuthService, Authenticator, UserManager, UserService};
use crate::config::Config;
use crate::infra::{UserRepository, UserStore};

/// Holds all application services behind their trait objects.
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
}

impl Services {
    /// Create a new service container with externally constructed services
    pub fn new(auth_service: Arc<dyn AuthService>, user_service: Arc<dyn UserService>) -> Self {
        Self {
            auth_service,
            user_service,
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(db: DatabaseConnection, config: Config) -> Self {
        let repo: Arc<dyn UserRepository> = Arc::new(UserStore::new(db));

        let notifier: Arc<dyn Notifier> = if config.smtp_configured() {
            match SmtpNotifier::from_config(&config) {
                Ok(smtp) => Arc::new(smtp),
                Err(e) => {
                    tracing::warn!("SMTP misconfigured ({}), logging outbound email instead", e);
                    Arc::new(LogNotifier)
                }
            }
        } else {
            tracing::warn!("SMTP not configured - outbound email will be logged, not sent");
            Arc::new(LogNotifier)
        };

        let reset_tokens = ResetTokenIssuer::from_config(&config);

        let user_service = Arc::new(UserManager::new(repo.clone(), notifier, reset_tokens));
        let auth_service = Arc::new(Authenticator::new(repo, config));

        Self {
            auth_service,
            user_service,
        }
    }

    /// Get authentication service
    pub fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    /// Get user service
    pub fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }
}

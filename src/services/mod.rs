//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.

mod auth_service;
pub mod container;
pub mod notifier;
pub mod reset_token;
mod user_service;

// Service Container
pub use container::Services;

// Service traits and implementations
pub use auth_service::{AccessToken, AuthService, Authenticator, Claims, TokenPair};
pub use notifier::{LogNotifier, Notifier, SmtpNotifier};
pub use reset_token::ResetTokenIssuer;
pub use user_service::{UserManager, UserService};

//! Custom request extractors.

mod auth;
mod validated_json;

pub use auth::MaybeUser;
pub use validated_json::ValidatedJson;

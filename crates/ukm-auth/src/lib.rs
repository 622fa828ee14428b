//! UKM Auth — the identity service (Argon2id credentials, verification
//! outbox), password policy and the login flow.

pub mod config;
pub mod error;
pub mod identity;
pub mod password;
pub mod service;

pub use config::AuthConfig;
pub use error::AuthError;
pub use identity::SurrealIdentityProvider;
pub use service::{LoginOutput, LoginService, dashboard_route};

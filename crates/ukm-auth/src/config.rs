//! Authentication configuration.

use serde::Deserialize;

/// Configuration for the identity service and the workflows that call it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Minimum password length for policy enforcement (default: 6).
    pub min_password_length: usize,
    /// Page the verification email links back to.
    pub verification_callback_url: String,
    /// Optional pepper prepended to passwords before Argon2id hashing.
    pub pepper: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            min_password_length: 6,
            verification_callback_url: "http://localhost:3000/login".into(),
            pepper: None,
        }
    }
}

//! Authentication error types.

use thiserror::Error;
use ukm_core::error::UkmError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("wrong password")]
    WrongPassword,

    #[error("unknown email")]
    UnknownEmail,

    #[error("password must be at least {min} characters")]
    WeakPassword { min: usize },

    #[error("email already in use")]
    EmailInUse,

    #[error("no member profile for account {0}")]
    ProfileMissing(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for UkmError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::WrongPassword | AuthError::UnknownEmail => {
                UkmError::AuthenticationFailed {
                    reason: err.to_string(),
                }
            }
            AuthError::WeakPassword { .. } => UkmError::Validation {
                message: err.to_string(),
            },
            AuthError::EmailInUse => UkmError::AlreadyExists {
                entity: "identity_account".into(),
            },
            AuthError::ProfileMissing(id) => UkmError::NotFound {
                entity: "member_account".into(),
                id,
            },
            AuthError::Crypto(msg) => UkmError::Identity(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_failures_keep_their_reason() {
        let wrong: UkmError = AuthError::WrongPassword.into();
        let unknown: UkmError = AuthError::UnknownEmail.into();
        assert!(
            matches!(wrong, UkmError::AuthenticationFailed { ref reason } if reason == "wrong password")
        );
        assert!(
            matches!(unknown, UkmError::AuthenticationFailed { ref reason } if reason == "unknown email")
        );
    }

    #[test]
    fn duplicate_email_maps_to_already_exists() {
        let err: UkmError = AuthError::EmailInUse.into();
        assert!(matches!(err, UkmError::AlreadyExists { .. }));
    }

    #[test]
    fn weak_password_is_a_validation_error() {
        let err: UkmError = AuthError::WeakPassword { min: 6 }.into();
        assert!(matches!(err, UkmError::Validation { message } if message.contains('6')));
    }
}

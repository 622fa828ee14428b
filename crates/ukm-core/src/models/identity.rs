//! Identity-service records.
//!
//! These are the identity provider's view of an account: credentials and
//! verification state. Profile data lives on
//! [`MemberAccount`](super::member::MemberAccount).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdentityAccount {
    pub id: Uuid,
    pub email: String,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A verification email queued for delivery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerificationRequest {
    pub account_id: Uuid,
    /// Address the message goes to (the account email at send time).
    pub email: String,
    /// Where the verification link lands the user afterwards.
    pub callback_url: String,
    pub requested_at: DateTime<Utc>,
}

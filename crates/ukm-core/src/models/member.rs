//! Member account domain model.
//!
//! A member account shares its primary key with the identity record it
//! mirrors: the id is the one assigned by the identity service.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MemberRole {
    Admin,
    Advisor,
    Chair,
    Secretary,
    Student,
    PendingVerifier,
}

impl MemberRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Advisor => "advisor",
            Self::Chair => "chair",
            Self::Secretary => "secretary",
            Self::Student => "student",
            Self::PendingVerifier => "pending_verifier",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "advisor" => Some(Self::Advisor),
            "chair" => Some(Self::Chair),
            "secretary" => Some(Self::Secretary),
            "student" => Some(Self::Student),
            "pending_verifier" => Some(Self::PendingVerifier),
            _ => None,
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selections a student makes at self-registration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudentProfile {
    /// Organization name exactly as selected on the form.
    pub organization_name: String,
    pub faculty: String,
    pub department: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemberAccount {
    /// Identity-service account id (join key between the two stores).
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    /// Fixed at creation.
    pub role: MemberRole,
    /// Organization the account belongs to, when one was resolved.
    pub organization_id: Option<Uuid>,
    pub profile: Option<StudentProfile>,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMemberAccount {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub role: MemberRole,
    pub organization_id: Option<Uuid>,
    pub profile: Option<StudentProfile>,
}

/// Fields that can be updated on an existing member account.
///
/// Role and organization are deliberately absent: neither is re-assignable.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateMemberAccount {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
}

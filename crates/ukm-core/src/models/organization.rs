//! Organization (UKM) domain model.
//!
//! An organization is a student unit with descriptive fields, a member
//! counter and up to three role slots. Slots are independent: each may be
//! empty, display-only (a name with no linked account) or linked to a
//! [`MemberAccount`](super::member::MemberAccount).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::member::MemberRole;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum OrganizationStatus {
    #[default]
    Active,
    Inactive,
}

impl OrganizationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }
}

/// The three role slots an organization carries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SlotRole {
    Advisor,
    Chair,
    Secretary,
}

impl SlotRole {
    /// Slots in the order the workflows process them.
    pub const ALL: [SlotRole; 3] = [SlotRole::Advisor, SlotRole::Chair, SlotRole::Secretary];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Advisor => "advisor",
            Self::Chair => "chair",
            Self::Secretary => "secretary",
        }
    }

    /// The account role assigned to a person provisioned into this slot.
    pub fn member_role(self) -> MemberRole {
        match self {
            Self::Advisor => MemberRole::Advisor,
            Self::Chair => MemberRole::Chair,
            Self::Secretary => MemberRole::Secretary,
        }
    }
}

impl fmt::Display for SlotRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A populated role slot.
///
/// `contact_email` mirrors the linked account's email and is only
/// meaningful while `linked_account_id` is present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleSlot {
    pub display_name: String,
    pub linked_account_id: Option<Uuid>,
    pub contact_email: Option<String>,
}

impl RoleSlot {
    pub fn is_linked(&self) -> bool {
        self.linked_account_id.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Organization {
    pub id: Uuid,
    /// Display name. Unique by convention only.
    pub name: String,
    pub description: String,
    pub status: OrganizationStatus,
    /// Mutated only through the store's atomic increment.
    pub member_count: u64,
    pub advisor: Option<RoleSlot>,
    pub chair: Option<RoleSlot>,
    pub secretary: Option<RoleSlot>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    pub fn slot(&self, role: SlotRole) -> Option<&RoleSlot> {
        match role {
            SlotRole::Advisor => self.advisor.as_ref(),
            SlotRole::Chair => self.chair.as_ref(),
            SlotRole::Secretary => self.secretary.as_ref(),
        }
    }

    /// Roles whose slot carries a linked account, in processing order.
    pub fn linked_roles(&self) -> Vec<(SlotRole, Uuid)> {
        SlotRole::ALL
            .into_iter()
            .filter_map(|role| {
                self.slot(role)
                    .and_then(|s| s.linked_account_id)
                    .map(|id| (role, id))
            })
            .collect()
    }
}

/// Fields required to create a new organization.
///
/// The member counter starts at zero and no slot is populated; slots are
/// attached afterwards through [`UpdateOrganization`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrganization {
    pub name: String,
    pub description: String,
    pub status: OrganizationStatus,
}

/// Merge-update of a single slot. `None` leaves the stored field untouched.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct RoleSlotUpdate {
    pub display_name: Option<String>,
    pub linked_account_id: Option<Uuid>,
    pub contact_email: Option<String>,
}

impl RoleSlotUpdate {
    /// A full slot as written after an account has been provisioned.
    pub fn linked(display_name: String, account_id: Uuid, email: String) -> Self {
        Self {
            display_name: Some(display_name),
            linked_account_id: Some(account_id),
            contact_email: Some(email),
        }
    }
}

/// Fields that can be merged into an existing organization.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateOrganization {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<OrganizationStatus>,
    pub advisor: Option<RoleSlotUpdate>,
    pub chair: Option<RoleSlotUpdate>,
    pub secretary: Option<RoleSlotUpdate>,
}

impl UpdateOrganization {
    pub fn slot_mut(&mut self, role: SlotRole) -> &mut Option<RoleSlotUpdate> {
        match role {
            SlotRole::Advisor => &mut self.advisor,
            SlotRole::Chair => &mut self.chair,
            SlotRole::Secretary => &mut self.secretary,
        }
    }

    pub fn slot(&self, role: SlotRole) -> Option<&RoleSlotUpdate> {
        match role {
            SlotRole::Advisor => self.advisor.as_ref(),
            SlotRole::Chair => self.chair.as_ref(),
            SlotRole::Secretary => self.secretary.as_ref(),
        }
    }

    /// Update touching only the given slot.
    pub fn for_slot(role: SlotRole, update: RoleSlotUpdate) -> Self {
        let mut out = Self::default();
        *out.slot_mut(role) = Some(update);
        out
    }
}

//! Organization edit.
//!
//! Descriptive fields are written first and unconditionally. Account
//! changes for each linked role follow, each role isolated from the
//! others: a failed role is recorded and the next one still runs.

use std::collections::HashMap;

use tracing::{info, warn};
use ukm_auth::password;
use ukm_core::models::member::{MemberAccount, UpdateMemberAccount};
use ukm_core::models::organization::{
    Organization, OrganizationStatus, RoleSlotUpdate, SlotRole, UpdateOrganization,
};
use ukm_core::repository::{IdentityProvider, MemberAccountRepository, OrganizationRepository};
use uuid::Uuid;

use crate::error::{ProvisioningError, RoleUpdateFailure, Step};
use crate::service::ProvisioningService;

/// Changes for one role slot. Empty strings mean "leave unchanged".
#[derive(Debug, Clone, Default)]
pub struct RoleEdit {
    pub display_name: String,
    pub new_email: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Default)]
pub struct EditOrganizationRequest {
    pub organization_id: Uuid,
    pub name: String,
    pub description: String,
    pub status: OrganizationStatus,
    pub advisor: Option<RoleEdit>,
    pub chair: Option<RoleEdit>,
    pub secretary: Option<RoleEdit>,
}

impl EditOrganizationRequest {
    pub fn role(&self, role: SlotRole) -> Option<&RoleEdit> {
        match role {
            SlotRole::Advisor => self.advisor.as_ref(),
            SlotRole::Chair => self.chair.as_ref(),
            SlotRole::Secretary => self.secretary.as_ref(),
        }
    }

    /// Step-one write: descriptive fields plus any supplied slot names.
    fn descriptive_update(&self) -> UpdateOrganization {
        let mut update = UpdateOrganization {
            name: Some(self.name.clone()),
            description: Some(self.description.clone()),
            status: Some(self.status),
            ..Default::default()
        };
        for role in SlotRole::ALL {
            if let Some(edit) = self.role(role).filter(|e| !e.display_name.is_empty()) {
                *update.slot_mut(role) = Some(RoleSlotUpdate {
                    display_name: Some(edit.display_name.clone()),
                    ..Default::default()
                });
            }
        }
        update
    }
}

/// What changed for one linked role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleUpdateReport {
    pub role: SlotRole,
    pub email_changed: bool,
    pub password_changed: bool,
}

/// Result of [`ProvisioningService::edit_organization`] once the
/// descriptive write has succeeded.
#[derive(Debug)]
pub struct EditOutcome {
    /// The organization as stored at the end of the edit.
    pub organization: Organization,
    /// Linked roles whose requested changes all applied.
    pub updated_roles: Vec<RoleUpdateReport>,
    pub failures: Vec<RoleUpdateFailure>,
}

impl EditOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_roles(&self) -> Vec<SlotRole> {
        self.failures.iter().map(|f| f.role).collect()
    }

    /// Turn any per-role failure into [`ProvisioningError::PartialUpdate`].
    pub fn into_result(self) -> Result<Organization, ProvisioningError> {
        if self.failures.is_empty() {
            Ok(self.organization)
        } else {
            Err(ProvisioningError::PartialUpdate {
                organization_id: self.organization.id,
                failures: self.failures,
            })
        }
    }
}

impl<O, M, I> ProvisioningService<O, M, I>
where
    O: OrganizationRepository,
    M: MemberAccountRepository,
    I: IdentityProvider,
{
    /// Edit an organization and its linked role accounts.
    ///
    /// Returns `Err` only when nothing was written: bad input, a missing
    /// organization, or a failed descriptive update. Per-role failures
    /// come back inside [`EditOutcome`].
    pub async fn edit_organization(
        &self,
        request: EditOrganizationRequest,
    ) -> Result<EditOutcome, ProvisioningError> {
        if request.name.trim().is_empty() {
            return Err(ProvisioningError::validation(
                None,
                "organization name is required",
            ));
        }

        let org_id = request.organization_id;
        let current = self
            .organizations
            .get_by_id(org_id)
            .await
            .map_err(ProvisioningError::store)?;

        // Snapshot linked accounts so "email differs" compares against
        // what was stored before this edit.
        let mut failures = Vec::new();
        let mut snapshot: HashMap<SlotRole, MemberAccount> = HashMap::new();
        for (role, account_id) in current.linked_roles() {
            match self.members.get_by_id(account_id).await {
                Ok(member) => {
                    snapshot.insert(role, member);
                }
                Err(e) => failures.push(RoleUpdateFailure {
                    role,
                    step: Step::LoadMemberAccount,
                    cause: ProvisioningError::store(e),
                }),
            }
        }

        let mut organization = self
            .organizations
            .update(org_id, request.descriptive_update())
            .await
            .map_err(ProvisioningError::store)?;
        info!(organization_id = %org_id, "Organization fields updated");

        let mut updated_roles = Vec::new();
        for (role, _) in current.linked_roles() {
            let Some(before) = snapshot.get(&role) else {
                continue;
            };
            let Some(edit) = request.role(role) else {
                continue;
            };

            let mut report = RoleUpdateReport {
                role,
                email_changed: false,
                password_changed: false,
            };
            let mut role_ok = true;

            if !edit.new_email.is_empty() && edit.new_email != before.email {
                match self.change_email(org_id, role, before, edit).await {
                    Ok(updated) => {
                        organization = updated;
                        report.email_changed = true;
                    }
                    Err(failure) => {
                        warn!(organization_id = %org_id, %failure, "Email change failed");
                        failures.push(failure);
                        role_ok = false;
                    }
                }
            }

            if !edit.new_password.is_empty() {
                match self.change_password(role, before.id, &edit.new_password).await {
                    Ok(()) => report.password_changed = true,
                    Err(failure) => {
                        warn!(organization_id = %org_id, %failure, "Password change failed");
                        failures.push(failure);
                        role_ok = false;
                    }
                }
            }

            if role_ok && (report.email_changed || report.password_changed) {
                updated_roles.push(report);
            }
        }

        info!(
            organization_id = %org_id,
            updated = updated_roles.len(),
            failed = failures.len(),
            "Organization edit finished"
        );
        Ok(EditOutcome {
            organization,
            updated_roles,
            failures,
        })
    }

    /// Identity email, fresh verification, member record, slot contact
    /// email. Returns the organization after the slot write.
    async fn change_email(
        &self,
        org_id: Uuid,
        role: SlotRole,
        before: &MemberAccount,
        edit: &RoleEdit,
    ) -> Result<Organization, RoleUpdateFailure> {
        let failure = |step, cause| RoleUpdateFailure { role, step, cause };
        let account_id = before.id;

        self.identity
            .update_email(account_id, &edit.new_email)
            .await
            .map_err(|e| {
                failure(
                    Step::UpdateEmail,
                    ProvisioningError::identity(e, Some(&edit.new_email)),
                )
            })?;

        self.identity
            .send_verification_email(account_id, &self.config.verification_callback_url)
            .await
            .map_err(|e| failure(Step::SendVerification, ProvisioningError::identity(e, None)))?;

        let display_name = if edit.display_name.is_empty() {
            before.display_name.clone()
        } else {
            edit.display_name.clone()
        };
        self.members
            .update(
                account_id,
                UpdateMemberAccount {
                    display_name: Some(display_name),
                    email: Some(edit.new_email.clone()),
                    email_verified: Some(false),
                },
            )
            .await
            .map_err(|e| failure(Step::UpdateMemberRecord, ProvisioningError::store(e)))?;

        let slot = RoleSlotUpdate {
            contact_email: Some(edit.new_email.clone()),
            ..Default::default()
        };
        let organization = self
            .organizations
            .update(org_id, UpdateOrganization::for_slot(role, slot))
            .await
            .map_err(|e| failure(Step::UpdateContactEmail, ProvisioningError::store(e)))?;

        info!(organization_id = %org_id, role = %role, account_id = %account_id, "Role email changed");
        Ok(organization)
    }

    async fn change_password(
        &self,
        role: SlotRole,
        account_id: Uuid,
        new_password: &str,
    ) -> Result<(), RoleUpdateFailure> {
        let min = self.config.min_password_length;
        if password::check_policy(new_password, min).is_err() {
            return Err(RoleUpdateFailure {
                role,
                step: Step::Validate,
                cause: ProvisioningError::validation(
                    Some(role),
                    format!("{role} password must be at least {min} characters"),
                ),
            });
        }

        self.identity
            .update_password(account_id, new_password)
            .await
            .map_err(|e| RoleUpdateFailure {
                role,
                step: Step::UpdatePassword,
                cause: ProvisioningError::identity(e, None),
            })?;

        info!(role = %role, account_id = %account_id, "Role password changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptive_update_skips_blank_slot_names() {
        let request = EditOrganizationRequest {
            name: "Robotics Club".into(),
            description: "Builds robots".into(),
            advisor: Some(RoleEdit {
                display_name: "Dr. Sari".into(),
                ..Default::default()
            }),
            chair: Some(RoleEdit::default()),
            ..Default::default()
        };
        let update = request.descriptive_update();
        assert_eq!(update.name.as_deref(), Some("Robotics Club"));
        assert_eq!(update.status, Some(OrganizationStatus::Active));
        assert_eq!(
            update
                .slot(SlotRole::Advisor)
                .and_then(|s| s.display_name.as_deref()),
            Some("Dr. Sari")
        );
        assert!(update.slot(SlotRole::Chair).is_none());
        assert!(update.slot(SlotRole::Secretary).is_none());
    }

    #[test]
    fn descriptive_update_never_touches_links() {
        let request = EditOrganizationRequest {
            name: "Robotics Club".into(),
            secretary: Some(RoleEdit {
                display_name: "Citra".into(),
                new_email: "citra@example.com".into(),
                new_password: "rahasia1".into(),
            }),
            ..Default::default()
        };
        let update = request.descriptive_update();
        let slot = update.slot(SlotRole::Secretary).unwrap();
        assert!(slot.linked_account_id.is_none());
        assert!(slot.contact_email.is_none());
    }
}

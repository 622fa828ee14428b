//! Organization creation.
//!
//! Phase one writes the organization document. Each requested role is
//! then provisioned in turn (identity account, verification email,
//! member record), and phase two merges the resulting slot links into the
//! organization. The first role failure stops the sequence; nothing
//! already written is rolled back.

use tracing::{error, info, warn};
use ukm_auth::password;
use ukm_core::models::member::{CreateMemberAccount, MemberAccount};
use ukm_core::models::organization::{
    CreateOrganization, Organization, OrganizationStatus, RoleSlotUpdate, SlotRole,
    UpdateOrganization,
};
use ukm_core::repository::{IdentityProvider, MemberAccountRepository, OrganizationRepository};
use uuid::Uuid;

use crate::error::{ProvisioningError, RoleFailure, Step};
use crate::service::ProvisioningService;

/// Credentials for one role account.
#[derive(Debug, Clone, Default)]
pub struct RoleAccountRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RoleAccountRequest {
    /// An account is only requested when name, email and password are all
    /// filled in. A partially filled slot is skipped without error.
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.email.is_empty() && !self.password.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateOrganizationRequest {
    pub name: String,
    pub description: String,
    pub status: OrganizationStatus,
    pub advisor: Option<RoleAccountRequest>,
    pub chair: Option<RoleAccountRequest>,
    pub secretary: Option<RoleAccountRequest>,
}

impl CreateOrganizationRequest {
    pub fn role(&self, role: SlotRole) -> Option<&RoleAccountRequest> {
        match role {
            SlotRole::Advisor => self.advisor.as_ref(),
            SlotRole::Chair => self.chair.as_ref(),
            SlotRole::Secretary => self.secretary.as_ref(),
        }
    }

    /// Roles that will get an account, in processing order.
    pub fn requested_roles(&self) -> Vec<SlotRole> {
        SlotRole::ALL
            .into_iter()
            .filter(|r| self.role(*r).is_some_and(RoleAccountRequest::is_complete))
            .collect()
    }

    /// Input checks that must pass before any external call.
    fn validate(&self, min_password_length: usize) -> Result<(), ProvisioningError> {
        if self.name.trim().is_empty() {
            return Err(ProvisioningError::validation(
                None,
                "organization name is required",
            ));
        }
        for role in SlotRole::ALL {
            let Some(request) = self.role(role) else {
                continue;
            };
            // Any supplied password is checked, even on a slot that will
            // be skipped for being incomplete.
            if !request.password.is_empty()
                && password::check_policy(&request.password, min_password_length).is_err()
            {
                return Err(ProvisioningError::validation(
                    Some(role),
                    format!("{role} password must be at least {min_password_length} characters"),
                ));
            }
        }
        Ok(())
    }
}

/// A role whose account was fully provisioned.
#[derive(Debug, Clone)]
pub struct ProvisionedRole {
    pub role: SlotRole,
    pub account: MemberAccount,
}

#[derive(Debug, Clone)]
pub struct ProvisionReport {
    /// The organization as stored after phase two.
    pub organization: Organization,
    pub roles: Vec<ProvisionedRole>,
}

impl ProvisionReport {
    pub fn completed_roles(&self) -> Vec<SlotRole> {
        self.roles.iter().map(|r| r.role).collect()
    }
}

/// Result of [`ProvisioningService::create_organization`].
#[derive(Debug)]
pub enum ProvisioningOutcome {
    /// Organization created and every requested role provisioned and linked.
    Complete(ProvisionReport),
    /// A role failed. Roles before it are provisioned and linked; the
    /// failed role and those after it are absent from the organization.
    Partial {
        report: ProvisionReport,
        failure: RoleFailure,
    },
    /// Accounts were provisioned but linking them into the organization
    /// failed, so every slot is still empty.
    Unlinked {
        organization: Organization,
        provisioned: Vec<ProvisionedRole>,
        role_failure: Option<RoleFailure>,
        cause: ProvisioningError,
    },
    /// Nothing was created: validation failed or the organization write
    /// itself failed.
    Failed(ProvisioningError),
}

impl ProvisioningOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }

    /// The organization, whenever phase one succeeded.
    pub fn organization(&self) -> Option<&Organization> {
        match self {
            Self::Complete(report) | Self::Partial { report, .. } => Some(&report.organization),
            Self::Unlinked { organization, .. } => Some(organization),
            Self::Failed(_) => None,
        }
    }

    /// Collapse into a `Result`, turning partial states into errors.
    pub fn into_result(self) -> Result<ProvisionReport, ProvisioningError> {
        match self {
            Self::Complete(report) => Ok(report),
            Self::Partial { report, failure } => Err(ProvisioningError::PartialProvisioning {
                organization_id: report.organization.id,
                completed: report.completed_roles(),
                failed_role: failure.role,
                step: failure.step,
                cause: Box::new(failure.cause),
            }),
            Self::Unlinked {
                organization,
                provisioned,
                cause,
                ..
            } => Err(ProvisioningError::RolesNotLinked {
                organization_id: organization.id,
                accounts: provisioned.iter().map(|p| p.account.id).collect(),
                cause: Box::new(cause),
            }),
            Self::Failed(err) => Err(err),
        }
    }
}

impl<O, M, I> ProvisioningService<O, M, I>
where
    O: OrganizationRepository,
    M: MemberAccountRepository,
    I: IdentityProvider,
{
    /// Create an organization and its requested role accounts.
    pub async fn create_organization(
        &self,
        request: CreateOrganizationRequest,
    ) -> ProvisioningOutcome {
        if let Err(err) = request.validate(self.config.min_password_length) {
            return ProvisioningOutcome::Failed(err);
        }

        // Phase one: the organization document anchors every role account.
        let organization = match self
            .organizations
            .create(CreateOrganization {
                name: request.name.clone(),
                description: request.description.clone(),
                status: request.status,
            })
            .await
        {
            Ok(org) => org,
            Err(e) => return ProvisioningOutcome::Failed(ProvisioningError::store(e)),
        };
        info!(organization_id = %organization.id, name = %organization.name, "Organization created");

        let mut provisioned = Vec::new();
        let mut role_failure = None;

        for role in request.requested_roles() {
            let Some(account) = request.role(role) else {
                continue;
            };
            match self.provision_role(organization.id, role, account).await {
                Ok(member) => provisioned.push(ProvisionedRole {
                    role,
                    account: member,
                }),
                Err(failure) => {
                    error!(
                        organization_id = %organization.id,
                        role = %role,
                        step = %failure.step,
                        error = %failure.cause,
                        "Role provisioning failed, skipping remaining roles"
                    );
                    role_failure = Some(failure);
                    break;
                }
            }
        }

        // Phase two: link whatever was provisioned.
        let organization = if provisioned.is_empty() {
            organization
        } else {
            match self.attach_roles(organization.id, &provisioned).await {
                Ok(org) => org,
                Err(cause) => {
                    warn!(
                        organization_id = %organization.id,
                        error = %cause,
                        "Provisioned accounts could not be linked"
                    );
                    return ProvisioningOutcome::Unlinked {
                        organization,
                        provisioned,
                        role_failure,
                        cause,
                    };
                }
            }
        };

        let report = ProvisionReport {
            organization,
            roles: provisioned,
        };
        match role_failure {
            Some(failure) => ProvisioningOutcome::Partial { report, failure },
            None => ProvisioningOutcome::Complete(report),
        }
    }

    /// Identity account, verification email and member record for one
    /// role. Stops at the first failing step.
    async fn provision_role(
        &self,
        organization_id: Uuid,
        role: SlotRole,
        request: &RoleAccountRequest,
    ) -> Result<MemberAccount, RoleFailure> {
        let failure = |step, orphaned_account, cause| RoleFailure {
            role,
            step,
            orphaned_account,
            cause,
        };

        let account_id = self
            .identity
            .create_account(&request.email, &request.password)
            .await
            .map_err(|e| {
                failure(
                    Step::CreateAccount,
                    None,
                    ProvisioningError::identity(e, Some(&request.email)),
                )
            })?;

        self.identity
            .send_verification_email(account_id, &self.config.verification_callback_url)
            .await
            .map_err(|e| {
                failure(
                    Step::SendVerification,
                    Some(account_id),
                    ProvisioningError::identity(e, None),
                )
            })?;

        let member = self
            .members
            .create(CreateMemberAccount {
                id: account_id,
                display_name: request.name.clone(),
                email: request.email.clone(),
                role: role.member_role(),
                organization_id: Some(organization_id),
                profile: None,
            })
            .await
            .map_err(|e| {
                failure(
                    Step::CreateMemberRecord,
                    Some(account_id),
                    ProvisioningError::store(e),
                )
            })?;

        info!(organization_id = %organization_id, role = %role, account_id = %account_id, "Role account provisioned");
        Ok(member)
    }

    /// Merge the slot links of every provisioned role in one update.
    async fn attach_roles(
        &self,
        organization_id: Uuid,
        provisioned: &[ProvisionedRole],
    ) -> Result<Organization, ProvisioningError> {
        let mut update = UpdateOrganization::default();
        for p in provisioned {
            *update.slot_mut(p.role) = Some(RoleSlotUpdate::linked(
                p.account.display_name.clone(),
                p.account.id,
                p.account.email.clone(),
            ));
        }
        self.organizations
            .update(organization_id, update)
            .await
            .map_err(ProvisioningError::store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(name: &str, email: &str, password: &str) -> RoleAccountRequest {
        RoleAccountRequest {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn incomplete_slots_are_not_requested() {
        let request = CreateOrganizationRequest {
            name: "Robotics Club".into(),
            advisor: Some(account("Dr. Sari", "sari@example.com", "")),
            chair: Some(account("Budi", "budi@example.com", "rahasia1")),
            secretary: Some(account("", "citra@example.com", "rahasia1")),
            ..Default::default()
        };
        assert_eq!(request.requested_roles(), vec![SlotRole::Chair]);
    }

    #[test]
    fn short_password_names_the_role() {
        let request = CreateOrganizationRequest {
            name: "Robotics Club".into(),
            secretary: Some(account("Citra", "citra@example.com", "12345")),
            ..Default::default()
        };
        let err = request.validate(6).unwrap_err();
        assert!(matches!(
            err,
            ProvisioningError::Validation {
                role: Some(SlotRole::Secretary),
                ..
            }
        ));
        assert!(err.to_string().contains("secretary"));
    }

    #[test]
    fn short_password_on_skipped_slot_still_fails() {
        let request = CreateOrganizationRequest {
            name: "Robotics Club".into(),
            chair: Some(account("", "", "abc")),
            ..Default::default()
        };
        assert!(request.requested_roles().is_empty());
        assert!(request.validate(6).is_err());
    }

    #[test]
    fn blank_name_is_rejected() {
        let request = CreateOrganizationRequest {
            name: "   ".into(),
            ..Default::default()
        };
        assert!(matches!(
            request.validate(6),
            Err(ProvisioningError::Validation { role: None, .. })
        ));
    }
}

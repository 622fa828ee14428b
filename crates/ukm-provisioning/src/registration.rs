//! Student self-registration.

use tracing::{info, warn};
use ukm_core::models::member::{CreateMemberAccount, MemberAccount, MemberRole, StudentProfile};
use ukm_core::models::organization::Organization;
use ukm_core::repository::{IdentityProvider, MemberAccountRepository, OrganizationRepository};

use crate::config::RegistrationCatalog;
use crate::error::ProvisioningError;

/// Options presented on the registration form.
///
/// The organization list is fetched once by [`RegistrationService::load_form`]
/// and the submitted name is matched against this list, not re-queried.
#[derive(Debug, Clone)]
pub struct RegistrationForm {
    pub organizations: Vec<Organization>,
    pub catalog: RegistrationCatalog,
}

impl RegistrationForm {
    /// First organization in the list carrying exactly this name.
    pub fn find_organization(&self, name: &str) -> Option<&Organization> {
        self.organizations.iter().find(|o| o.name == name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegistrationInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub organization_name: String,
    pub faculty: String,
    pub department: String,
}

impl RegistrationInput {
    fn validate(&self) -> Result<(), ProvisioningError> {
        let fields = [
            ("name", &self.name),
            ("email", &self.email),
            ("password", &self.password),
            ("organization", &self.organization_name),
            ("faculty", &self.faculty),
            ("department", &self.department),
        ];
        match fields.iter().find(|(_, v)| v.trim().is_empty()) {
            Some((field, _)) => Err(ProvisioningError::validation(
                None,
                format!("{field} is required"),
            )),
            None => Ok(()),
        }
    }
}

/// What happened to the organization's member counter.
#[derive(Debug, Clone)]
pub enum CounterUpdate {
    Incremented(Organization),
    /// The submitted name matched nothing in the form's organization list.
    NoMatch,
    /// The increment call itself failed.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub member: MemberAccount,
    pub counter: CounterUpdate,
}

pub struct RegistrationService<O, M, I>
where
    O: OrganizationRepository,
    M: MemberAccountRepository,
    I: IdentityProvider,
{
    organizations: O,
    members: M,
    identity: I,
    catalog: RegistrationCatalog,
}

impl<O, M, I> RegistrationService<O, M, I>
where
    O: OrganizationRepository,
    M: MemberAccountRepository,
    I: IdentityProvider,
{
    pub fn new(organizations: O, members: M, identity: I) -> Self {
        Self::with_catalog(organizations, members, identity, RegistrationCatalog::default())
    }

    pub fn with_catalog(
        organizations: O,
        members: M,
        identity: I,
        catalog: RegistrationCatalog,
    ) -> Self {
        Self {
            organizations,
            members,
            identity,
            catalog,
        }
    }

    pub async fn load_form(&self) -> Result<RegistrationForm, ProvisioningError> {
        let organizations = self
            .organizations
            .list()
            .await
            .map_err(ProvisioningError::store)?;
        Ok(RegistrationForm {
            organizations,
            catalog: self.catalog.clone(),
        })
    }

    /// Register a student under the organization selected on `form`.
    ///
    /// The member account is created whenever the identity step succeeds.
    /// The counter increment is best effort and reported in
    /// [`Registration::counter`], never as an error.
    pub async fn register(
        &self,
        form: &RegistrationForm,
        input: RegistrationInput,
    ) -> Result<Registration, ProvisioningError> {
        input.validate()?;

        // Password length is enforced by the identity service.
        let account_id = self
            .identity
            .create_account(&input.email, &input.password)
            .await
            .map_err(|e| ProvisioningError::identity(e, Some(&input.email)))?;

        let organization = form.find_organization(&input.organization_name);
        let member = self
            .members
            .create(CreateMemberAccount {
                id: account_id,
                display_name: input.name,
                email: input.email,
                role: MemberRole::Student,
                organization_id: organization.map(|o| o.id),
                profile: Some(StudentProfile {
                    organization_name: input.organization_name.clone(),
                    faculty: input.faculty,
                    department: input.department,
                }),
            })
            .await
            .map_err(ProvisioningError::store)?;
        info!(account_id = %account_id, organization = %input.organization_name, "Student registered");

        let counter = match organization {
            None => {
                warn!(
                    account_id = %account_id,
                    organization = %input.organization_name,
                    "No organization matched, member count not incremented"
                );
                CounterUpdate::NoMatch
            }
            Some(org) => match self.organizations.increment_member_count(org.id, 1).await {
                Ok(updated) => CounterUpdate::Incremented(updated),
                Err(e) => {
                    warn!(
                        account_id = %account_id,
                        organization_id = %org.id,
                        error = %e,
                        "Member count increment failed"
                    );
                    CounterUpdate::Failed(e.to_string())
                }
            },
        };

        Ok(Registration { member, counter })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> RegistrationInput {
        RegistrationInput {
            name: "Ani".into(),
            email: "ani@example.com".into(),
            password: "rahasia1".into(),
            organization_name: "Robotics Club".into(),
            faculty: "Engineering".into(),
            department: "Electrical".into(),
        }
    }

    #[test]
    fn complete_input_is_valid() {
        assert!(input().validate().is_ok());
    }

    #[test]
    fn missing_department_is_named() {
        let err = RegistrationInput {
            department: String::new(),
            ..input()
        }
        .validate()
        .unwrap_err();
        assert!(err.to_string().contains("department"), "{err}");
    }

    #[test]
    fn short_password_is_left_to_identity_service() {
        let short = RegistrationInput {
            password: "abc".into(),
            ..input()
        };
        assert!(short.validate().is_ok());
    }
}

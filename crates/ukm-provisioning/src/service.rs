//! The provisioning service and its collaborators.

use ukm_auth::config::AuthConfig;
use ukm_core::repository::{IdentityProvider, MemberAccountRepository, OrganizationRepository};

/// Organization provisioning service.
///
/// Generic over the collaborator traits; the workflows themselves live
/// in [`create`](crate::create) and [`edit`](crate::edit).
pub struct ProvisioningService<O, M, I>
where
    O: OrganizationRepository,
    M: MemberAccountRepository,
    I: IdentityProvider,
{
    pub(crate) organizations: O,
    pub(crate) members: M,
    pub(crate) identity: I,
    pub(crate) config: AuthConfig,
}

impl<O, M, I> ProvisioningService<O, M, I>
where
    O: OrganizationRepository,
    M: MemberAccountRepository,
    I: IdentityProvider,
{
    pub fn new(organizations: O, members: M, identity: I, config: AuthConfig) -> Self {
        Self {
            organizations,
            members,
            identity,
            config,
        }
    }

    pub fn organizations(&self) -> &O {
        &self.organizations
    }

    pub fn members(&self) -> &M {
        &self.members
    }

    pub fn identity(&self) -> &I {
        &self.identity
    }
}

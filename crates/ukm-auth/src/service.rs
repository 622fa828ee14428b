//! Login orchestration: credentials, member profile, dashboard route.

use ukm_core::error::{UkmError, UkmResult};
use ukm_core::models::member::{MemberAccount, MemberRole};
use ukm_core::repository::{IdentityProvider, MemberAccountRepository};

use crate::error::AuthError;

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    pub member: MemberAccount,
    /// Route the caller should land on.
    pub redirect: String,
}

/// Dashboard route for a member.
///
/// Advisors land on their organization's page; roles without a
/// dashboard fall back to `/dashboard`.
pub fn dashboard_route(member: &MemberAccount) -> String {
    match member.role {
        MemberRole::Admin => "/dashboard/admin".into(),
        MemberRole::Student => "/dashboard/student".into(),
        MemberRole::Secretary => "/dashboard/secretary".into(),
        MemberRole::Chair => "/dashboard/chair".into(),
        MemberRole::Advisor => match member.organization_id {
            Some(org) => format!("/dashboard/advisor/{org}"),
            None => "/dashboard".into(),
        },
        MemberRole::PendingVerifier => "/dashboard".into(),
    }
}

/// Login service.
///
/// Generic over the collaborator traits so the auth layer has no
/// dependency on a concrete store.
pub struct LoginService<I: IdentityProvider, M: MemberAccountRepository> {
    identity: I,
    members: M,
}

impl<I: IdentityProvider, M: MemberAccountRepository> LoginService<I, M> {
    pub fn new(identity: I, members: M) -> Self {
        Self { identity, members }
    }

    /// Authenticate with email + password and resolve where to go next.
    ///
    /// Unknown email and wrong password surface as distinct
    /// `AuthenticationFailed` reasons. An identity without a member
    /// profile is reported as [`AuthError::ProfileMissing`].
    pub async fn login(&self, email: &str, password: &str) -> UkmResult<LoginOutput> {
        let account_id = self.identity.sign_in(email, password).await?;

        let member = match self.members.get_by_id(account_id).await {
            Ok(m) => m,
            Err(UkmError::NotFound { .. }) => {
                return Err(AuthError::ProfileMissing(account_id.to_string()).into());
            }
            Err(e) => return Err(e),
        };

        let redirect = dashboard_route(&member);
        tracing::info!(account_id = %account_id, role = %member.role, "Member signed in");

        Ok(LoginOutput { member, redirect })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn member(role: MemberRole, organization_id: Option<Uuid>) -> MemberAccount {
        MemberAccount {
            id: Uuid::new_v4(),
            display_name: "Ani".into(),
            email: "ani@example.com".into(),
            role,
            organization_id,
            profile: None,
            email_verified: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn fixed_routes() {
        assert_eq!(dashboard_route(&member(MemberRole::Admin, None)), "/dashboard/admin");
        assert_eq!(
            dashboard_route(&member(MemberRole::Student, None)),
            "/dashboard/student"
        );
        assert_eq!(dashboard_route(&member(MemberRole::Chair, None)), "/dashboard/chair");
        assert_eq!(
            dashboard_route(&member(MemberRole::Secretary, None)),
            "/dashboard/secretary"
        );
        assert_eq!(
            dashboard_route(&member(MemberRole::PendingVerifier, None)),
            "/dashboard"
        );
    }

    #[test]
    fn advisor_route_carries_organization() {
        let org = Uuid::new_v4();
        assert_eq!(
            dashboard_route(&member(MemberRole::Advisor, Some(org))),
            format!("/dashboard/advisor/{org}")
        );
    }
}

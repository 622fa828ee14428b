//! Collaborator trait definitions.
//!
//! The workflows talk to two external services: a document store (split
//! into one repository per collection) and an identity provider. All
//! operations are async and none of them span collections, so callers
//! must not assume any cross-call atomicity.

use uuid::Uuid;

use crate::error::UkmResult;
use crate::models::{
    identity::{IdentityAccount, VerificationRequest},
    member::{CreateMemberAccount, MemberAccount, MemberRole, UpdateMemberAccount},
    organization::{CreateOrganization, Organization, UpdateOrganization},
};

// ---------------------------------------------------------------------------
// Document store
// ---------------------------------------------------------------------------

pub trait OrganizationRepository: Send + Sync {
    /// Create an organization with `member_count = 0` and no slots.
    fn create(
        &self,
        input: CreateOrganization,
    ) -> impl Future<Output = UkmResult<Organization>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = UkmResult<Organization>> + Send;
    /// All organizations with exactly this display name, oldest first.
    fn find_by_name(&self, name: &str)
    -> impl Future<Output = UkmResult<Vec<Organization>>> + Send;
    /// All organizations, oldest first.
    fn list(&self) -> impl Future<Output = UkmResult<Vec<Organization>>> + Send;
    /// Merge-update: only the supplied fields are written.
    fn update(
        &self,
        id: Uuid,
        input: UpdateOrganization,
    ) -> impl Future<Output = UkmResult<Organization>> + Send;
    /// Atomically add `delta` to `member_count` on the store side.
    fn increment_member_count(
        &self,
        id: Uuid,
        delta: i64,
    ) -> impl Future<Output = UkmResult<Organization>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = UkmResult<()>> + Send;
}

pub trait MemberAccountRepository: Send + Sync {
    /// Create a member account keyed by the identity-assigned id.
    /// New accounts start with `email_verified = false`.
    fn create(
        &self,
        input: CreateMemberAccount,
    ) -> impl Future<Output = UkmResult<MemberAccount>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = UkmResult<MemberAccount>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateMemberAccount,
    ) -> impl Future<Output = UkmResult<MemberAccount>> + Send;
    /// Accounts with the given role, optionally restricted to one
    /// organization, oldest first.
    fn list_by_role(
        &self,
        role: MemberRole,
        organization_id: Option<Uuid>,
    ) -> impl Future<Output = UkmResult<Vec<MemberAccount>>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = UkmResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Identity service
// ---------------------------------------------------------------------------

pub trait IdentityProvider: Send + Sync {
    /// Register credentials and return the new account id.
    ///
    /// An email that is already registered fails with
    /// [`UkmError::AlreadyExists`](crate::error::UkmError::AlreadyExists).
    fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = UkmResult<Uuid>> + Send;
    /// Change the login email. The account becomes unverified.
    fn update_email(
        &self,
        account_id: Uuid,
        new_email: &str,
    ) -> impl Future<Output = UkmResult<()>> + Send;
    fn update_password(
        &self,
        account_id: Uuid,
        new_password: &str,
    ) -> impl Future<Output = UkmResult<()>> + Send;
    /// Queue a verification email whose link returns to `callback_url`.
    fn send_verification_email(
        &self,
        account_id: Uuid,
        callback_url: &str,
    ) -> impl Future<Output = UkmResult<()>> + Send;
    /// Check credentials and return the account id.
    fn sign_in(&self, email: &str, password: &str)
    -> impl Future<Output = UkmResult<Uuid>> + Send;
    fn get_account(
        &self,
        account_id: Uuid,
    ) -> impl Future<Output = UkmResult<IdentityAccount>> + Send;
    /// Verification emails queued for an account, oldest first.
    fn pending_verifications(
        &self,
        account_id: Uuid,
    ) -> impl Future<Output = UkmResult<Vec<VerificationRequest>>> + Send;
}

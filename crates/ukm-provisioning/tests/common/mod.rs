//! Shared fixtures: in-memory store plus collaborators that can be told
//! to fail specific calls.

#![allow(dead_code)]

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use ukm_auth::{AuthConfig, SurrealIdentityProvider};
use ukm_core::error::{UkmError, UkmResult};
use ukm_core::models::identity::{IdentityAccount, VerificationRequest};
use ukm_core::models::organization::{CreateOrganization, Organization, UpdateOrganization};
use ukm_core::repository::{IdentityProvider, OrganizationRepository};
use ukm_db::repository::{SurrealMemberAccountRepository, SurrealOrganizationRepository};
use ukm_provisioning::{ProvisioningService, RoleAccountRequest};
use uuid::Uuid;

pub type TestService = ProvisioningService<
    FlakyOrganizations,
    SurrealMemberAccountRepository<Db>,
    FlakyIdentity,
>;

/// Identity calls that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    CreateAccount,
    UpdateEmail,
    UpdatePassword,
    SendVerification,
}

/// Wraps the real provider and fails the configured `(op, email)` pairs
/// with an outage. For calls keyed by account id, the email is the one
/// currently stored for that account; for `UpdateEmail` it is the new one.
pub struct FlakyIdentity {
    inner: SurrealIdentityProvider<Db>,
    failures: Vec<(Op, String)>,
}

impl FlakyIdentity {
    fn fails(&self, op: Op, email: &str) -> bool {
        self.failures.iter().any(|(o, e)| *o == op && e == email)
    }

    async fn fails_for(&self, op: Op, account_id: Uuid) -> UkmResult<bool> {
        if !self.failures.iter().any(|(o, _)| *o == op) {
            return Ok(false);
        }
        let account = self.inner.get_account(account_id).await?;
        Ok(self.fails(op, &account.email))
    }
}

fn outage() -> UkmError {
    UkmError::Identity("service unavailable".into())
}

impl IdentityProvider for FlakyIdentity {
    async fn create_account(&self, email: &str, password: &str) -> UkmResult<Uuid> {
        if self.fails(Op::CreateAccount, email) {
            return Err(outage());
        }
        self.inner.create_account(email, password).await
    }

    async fn update_email(&self, account_id: Uuid, new_email: &str) -> UkmResult<()> {
        if self.fails(Op::UpdateEmail, new_email) {
            return Err(outage());
        }
        self.inner.update_email(account_id, new_email).await
    }

    async fn update_password(&self, account_id: Uuid, new_password: &str) -> UkmResult<()> {
        if self.fails_for(Op::UpdatePassword, account_id).await? {
            return Err(outage());
        }
        self.inner.update_password(account_id, new_password).await
    }

    async fn send_verification_email(&self, account_id: Uuid, callback_url: &str) -> UkmResult<()> {
        if self.fails_for(Op::SendVerification, account_id).await? {
            return Err(outage());
        }
        self.inner
            .send_verification_email(account_id, callback_url)
            .await
    }

    async fn sign_in(&self, email: &str, password: &str) -> UkmResult<Uuid> {
        self.inner.sign_in(email, password).await
    }

    async fn get_account(&self, account_id: Uuid) -> UkmResult<IdentityAccount> {
        self.inner.get_account(account_id).await
    }

    async fn pending_verifications(&self, account_id: Uuid) -> UkmResult<Vec<VerificationRequest>> {
        self.inner.pending_verifications(account_id).await
    }
}

/// Organization store whose merge-updates can be switched to fail; every
/// other call goes straight through.
pub struct FlakyOrganizations {
    inner: SurrealOrganizationRepository<Db>,
    fail_updates: bool,
}

impl OrganizationRepository for FlakyOrganizations {
    async fn create(&self, input: CreateOrganization) -> UkmResult<Organization> {
        self.inner.create(input).await
    }

    async fn get_by_id(&self, id: Uuid) -> UkmResult<Organization> {
        self.inner.get_by_id(id).await
    }

    async fn find_by_name(&self, name: &str) -> UkmResult<Vec<Organization>> {
        self.inner.find_by_name(name).await
    }

    async fn list(&self) -> UkmResult<Vec<Organization>> {
        self.inner.list().await
    }

    async fn update(&self, id: Uuid, input: UpdateOrganization) -> UkmResult<Organization> {
        if self.fail_updates {
            return Err(UkmError::Database("write rejected".into()));
        }
        self.inner.update(id, input).await
    }

    async fn increment_member_count(&self, id: Uuid, delta: i64) -> UkmResult<Organization> {
        self.inner.increment_member_count(id, delta).await
    }

    async fn delete(&self, id: Uuid) -> UkmResult<()> {
        self.inner.delete(id).await
    }
}

pub fn callback_url() -> String {
    AuthConfig::default().verification_callback_url
}

pub fn role_account(name: &str, email: &str) -> RoleAccountRequest {
    RoleAccountRequest {
        name: name.into(),
        email: email.into(),
        password: "rahasia1".into(),
    }
}

/// In-memory DB with migrations applied.
pub async fn database() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    ukm_db::run_migrations(&db).await.unwrap();
    db
}

pub async fn setup() -> TestService {
    setup_with(Vec::new()).await
}

pub async fn setup_with(failures: Vec<(Op, &str)>) -> TestService {
    build(failures, false).await
}

/// Service whose organization merge-updates always fail.
pub async fn setup_failing_updates() -> TestService {
    build(Vec::new(), true).await
}

async fn build(failures: Vec<(Op, &str)>, fail_updates: bool) -> TestService {
    let db = database().await;
    let identity = FlakyIdentity {
        inner: SurrealIdentityProvider::new(db.clone()),
        failures: failures
            .into_iter()
            .map(|(op, email)| (op, email.to_string()))
            .collect(),
    };
    ProvisioningService::new(
        FlakyOrganizations {
            inner: SurrealOrganizationRepository::new(db.clone()),
            fail_updates,
        },
        SurrealMemberAccountRepository::new(db),
        identity,
        AuthConfig::default(),
    )
}

//! SurrealDB-backed implementation of [`IdentityProvider`].
//!
//! Credentials live in `identity_account`; verification emails are
//! appended to the `email_verification` outbox and delivered elsewhere.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use ukm_core::error::{UkmError, UkmResult};
use ukm_core::models::identity::{IdentityAccount, VerificationRequest};
use ukm_core::repository::IdentityProvider;
use ukm_db::DbError;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;

#[derive(Debug, SurrealValue)]
struct IdentityRow {
    email: String,
    email_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CredentialRow {
    record_id: String,
    password_hash: String,
}

#[derive(Debug, SurrealValue)]
struct VerificationRow {
    account_id: String,
    email: String,
    callback_url: String,
    requested_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct IdRow {
    record_id: String,
}

fn parse_uuid(s: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))
}

/// Unique index guarding `identity_account.email`.
const EMAIL_INDEX: &str = "idx_identity_email";

/// Classify a failed `CREATE`. Only a violation of the email index means
/// the address is taken; anything else is a store failure.
fn create_failure(message: String) -> UkmError {
    if message.contains(EMAIL_INDEX) {
        AuthError::EmailInUse.into()
    } else {
        DbError::Query(message).into()
    }
}

fn not_found(id: Uuid) -> DbError {
    DbError::NotFound {
        entity: "identity_account".into(),
        id: id.to_string(),
    }
}

/// Identity service backed by the same SurrealDB instance as the
/// document store.
#[derive(Clone)]
pub struct SurrealIdentityProvider<C: Connection> {
    db: Surreal<C>,
    min_password_length: usize,
    pepper: Option<String>,
}

impl<C: Connection> SurrealIdentityProvider<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self::with_config(db, &AuthConfig::default())
    }

    pub fn with_config(db: Surreal<C>, config: &AuthConfig) -> Self {
        Self {
            db,
            min_password_length: config.min_password_length,
            pepper: config.pepper.clone(),
        }
    }

    /// Id of the account registered under `email`, if any.
    async fn account_for_email(&self, email: &str) -> UkmResult<Option<Uuid>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id FROM identity_account WHERE email = $email")
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<IdRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(parse_uuid(&row.record_id)?)),
            None => Ok(None),
        }
    }

    /// Fail with `EmailInUse` unless `email` is free or already owned by
    /// `owner`.
    async fn ensure_email_free(&self, email: &str, owner: Option<Uuid>) -> UkmResult<()> {
        match self.account_for_email(email).await? {
            Some(existing) if Some(existing) != owner => Err(AuthError::EmailInUse.into()),
            _ => Ok(()),
        }
    }

    fn hash(&self, password: &str) -> UkmResult<String> {
        password::check_policy(password, self.min_password_length)?;
        Ok(password::hash_password(password, self.pepper.as_deref())?)
    }

    /// Run an `UPDATE` against one identity record and fail with
    /// `NotFound` when nothing matched.
    async fn update_one(
        &self,
        account_id: Uuid,
        query: &str,
        binding: (&'static str, String),
    ) -> UkmResult<()> {
        let result = self
            .db
            .query(query)
            .bind(("id", account_id.to_string()))
            .bind(binding)
            .await
            .map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;
        let rows: Vec<IdentityRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(not_found(account_id).into());
        }
        Ok(())
    }
}

impl<C: Connection> IdentityProvider for SurrealIdentityProvider<C> {
    async fn create_account(&self, email: &str, password: &str) -> UkmResult<Uuid> {
        let password_hash = self.hash(password)?;
        self.ensure_email_free(email, None).await?;

        let id = Uuid::new_v4();
        self.db
            .query(
                "CREATE type::record('identity_account', $id) SET \
                 email = $email, password_hash = $password_hash, \
                 email_verified = false",
            )
            .bind(("id", id.to_string()))
            .bind(("email", email.to_string()))
            .bind(("password_hash", password_hash))
            .await
            .map_err(DbError::from)?
            .check()
            // The unique index still guards against a racing registration.
            .map_err(|e| create_failure(e.to_string()))?;

        debug!(account_id = %id, "Identity account created");
        Ok(id)
    }

    async fn update_email(&self, account_id: Uuid, new_email: &str) -> UkmResult<()> {
        self.ensure_email_free(new_email, Some(account_id)).await?;
        self.update_one(
            account_id,
            "UPDATE type::record('identity_account', $id) SET \
             email = $email, email_verified = false, updated_at = time::now()",
            ("email", new_email.to_string()),
        )
        .await
    }

    async fn update_password(&self, account_id: Uuid, new_password: &str) -> UkmResult<()> {
        let password_hash = self.hash(new_password)?;
        self.update_one(
            account_id,
            "UPDATE type::record('identity_account', $id) SET \
             password_hash = $password_hash, updated_at = time::now()",
            ("password_hash", password_hash),
        )
        .await
    }

    async fn send_verification_email(&self, account_id: Uuid, callback_url: &str) -> UkmResult<()> {
        let account = self.get_account(account_id).await?;

        self.db
            .query(
                "UPDATE type::record('identity_account', $id) SET \
                 email_verified = false, updated_at = time::now(); \
                 CREATE email_verification SET account_id = $id, \
                 email = $email, callback_url = $callback_url",
            )
            .bind(("id", account_id.to_string()))
            .bind(("email", account.email))
            .bind(("callback_url", callback_url.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        debug!(account_id = %account_id, "Verification email queued");
        Ok(())
    }

    async fn sign_in(&self, email: &str, password: &str) -> UkmResult<Uuid> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, password_hash \
                 FROM identity_account WHERE email = $email",
            )
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<CredentialRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or(AuthError::UnknownEmail)?;

        if !password::verify_password(password, &row.password_hash, self.pepper.as_deref())? {
            return Err(AuthError::WrongPassword.into());
        }

        Ok(parse_uuid(&row.record_id)?)
    }

    async fn get_account(&self, account_id: Uuid) -> UkmResult<IdentityAccount> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('identity_account', $id)")
            .bind(("id", account_id.to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<IdentityRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| not_found(account_id))?;

        Ok(IdentityAccount {
            id: account_id,
            email: row.email,
            email_verified: row.email_verified,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    async fn pending_verifications(&self, account_id: Uuid) -> UkmResult<Vec<VerificationRequest>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM email_verification WHERE account_id = $id \
                 ORDER BY requested_at ASC",
            )
            .bind(("id", account_id.to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<VerificationRow> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| {
                Ok(VerificationRequest {
                    account_id: parse_uuid(&row.account_id)?,
                    email: row.email,
                    callback_url: row.callback_url,
                    requested_at: row.requested_at,
                })
            })
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }
}

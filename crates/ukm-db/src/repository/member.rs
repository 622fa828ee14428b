//! SurrealDB implementation of [`MemberAccountRepository`].
//!
//! Records are created under the identity-assigned id, so the record key
//! doubles as the join key with `identity_account`.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use ukm_core::error::UkmResult;
use ukm_core::models::member::{
    CreateMemberAccount, MemberAccount, MemberRole, StudentProfile, UpdateMemberAccount,
};
use ukm_core::repository::MemberAccountRepository;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct MemberRow {
    display_name: String,
    email: String,
    role: String,
    organization_id: Option<String>,
    organization_name: Option<String>,
    faculty: Option<String>,
    department: Option<String>,
    email_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct MemberRowWithId {
    record_id: String,
    display_name: String,
    email: String,
    role: String,
    organization_id: Option<String>,
    organization_name: Option<String>,
    faculty: Option<String>,
    department: Option<String>,
    email_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_role(s: &str) -> Result<MemberRole, DbError> {
    MemberRole::parse(s).ok_or_else(|| DbError::Corrupt(format!("unknown member role: {s}")))
}

fn parse_uuid(s: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))
}

/// The profile is stored flat; it is only reassembled when all three
/// columns are present.
fn profile_from_columns(
    organization_name: Option<String>,
    faculty: Option<String>,
    department: Option<String>,
) -> Option<StudentProfile> {
    Some(StudentProfile {
        organization_name: organization_name?,
        faculty: faculty?,
        department: department?,
    })
}

impl MemberRow {
    fn into_member(self, id: Uuid) -> Result<MemberAccount, DbError> {
        Ok(MemberAccount {
            id,
            display_name: self.display_name,
            email: self.email,
            role: parse_role(&self.role)?,
            organization_id: self.organization_id.as_deref().map(parse_uuid).transpose()?,
            profile: profile_from_columns(self.organization_name, self.faculty, self.department),
            email_verified: self.email_verified,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl MemberRowWithId {
    fn try_into_member(self) -> Result<MemberAccount, DbError> {
        let id = parse_uuid(&self.record_id)?;
        MemberRow {
            display_name: self.display_name,
            email: self.email,
            role: self.role,
            organization_id: self.organization_id,
            organization_name: self.organization_name,
            faculty: self.faculty,
            department: self.department,
            email_verified: self.email_verified,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_member(id)
    }
}

/// SurrealDB implementation of the member-account repository.
#[derive(Clone)]
pub struct SurrealMemberAccountRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealMemberAccountRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> MemberAccountRepository for SurrealMemberAccountRepository<C> {
    async fn create(&self, input: CreateMemberAccount) -> UkmResult<MemberAccount> {
        let id_str = input.id.to_string();
        let (organization_name, faculty, department) = match input.profile {
            Some(p) => (Some(p.organization_name), Some(p.faculty), Some(p.department)),
            None => (None, None, None),
        };

        let result = self
            .db
            .query(
                "CREATE type::record('member_account', $id) SET \
                 display_name = $display_name, email = $email, \
                 role = $role, organization_id = $organization_id, \
                 organization_name = $organization_name, \
                 faculty = $faculty, department = $department, \
                 email_verified = false",
            )
            .bind(("id", id_str.clone()))
            .bind(("display_name", input.display_name))
            .bind(("email", input.email))
            .bind(("role", input.role.as_str().to_string()))
            .bind((
                "organization_id",
                input.organization_id.map(|id| id.to_string()),
            ))
            .bind(("organization_name", organization_name))
            .bind(("faculty", faculty))
            .bind(("department", department))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<MemberRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "member_account".into(),
            id: id_str,
        })?;

        Ok(row.into_member(input.id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> UkmResult<MemberAccount> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('member_account', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MemberRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "member_account".into(),
            id: id_str,
        })?;

        Ok(row.into_member(id)?)
    }

    async fn update(&self, id: Uuid, input: UpdateMemberAccount) -> UkmResult<MemberAccount> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.display_name.is_some() {
            sets.push("display_name = $display_name");
        }
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.email_verified.is_some() {
            sets.push("email_verified = $email_verified");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('member_account', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));
        if let Some(display_name) = input.display_name {
            builder = builder.bind(("display_name", display_name));
        }
        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(email_verified) = input.email_verified {
            builder = builder.bind(("email_verified", email_verified));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<MemberRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "member_account".into(),
            id: id_str,
        })?;

        Ok(row.into_member(id)?)
    }

    async fn list_by_role(
        &self,
        role: MemberRole,
        organization_id: Option<Uuid>,
    ) -> UkmResult<Vec<MemberAccount>> {
        let mut builder = match organization_id {
            Some(org) => self
                .db
                .query(
                    "SELECT meta::id(id) AS record_id, * FROM member_account \
                     WHERE role = $role AND organization_id = $organization_id \
                     ORDER BY created_at ASC",
                )
                .bind(("organization_id", org.to_string())),
            None => self.db.query(
                "SELECT meta::id(id) AS record_id, * FROM member_account \
                 WHERE role = $role ORDER BY created_at ASC",
            ),
        };
        builder = builder.bind(("role", role.as_str().to_string()));

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<MemberRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_member())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }

    async fn delete(&self, id: Uuid) -> UkmResult<()> {
        self.db
            .query("DELETE type::record('member_account', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }
}

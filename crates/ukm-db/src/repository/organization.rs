//! SurrealDB implementation of [`OrganizationRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use ukm_core::error::UkmResult;
use ukm_core::models::organization::{
    CreateOrganization, Organization, OrganizationStatus, RoleSlot, SlotRole, UpdateOrganization,
};
use ukm_core::repository::OrganizationRepository;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct OrganizationRow {
    name: String,
    description: String,
    status: String,
    member_count: u64,
    advisor_name: Option<String>,
    advisor_account_id: Option<String>,
    advisor_email: Option<String>,
    chair_name: Option<String>,
    chair_account_id: Option<String>,
    chair_email: Option<String>,
    secretary_name: Option<String>,
    secretary_account_id: Option<String>,
    secretary_email: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct OrganizationRowWithId {
    record_id: String,
    name: String,
    description: String,
    status: String,
    member_count: u64,
    advisor_name: Option<String>,
    advisor_account_id: Option<String>,
    advisor_email: Option<String>,
    chair_name: Option<String>,
    chair_account_id: Option<String>,
    chair_email: Option<String>,
    secretary_name: Option<String>,
    secretary_account_id: Option<String>,
    secretary_email: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrganizationRowWithId {
    fn try_into_organization(self) -> Result<Organization, DbError> {
        let id = parse_uuid(&self.record_id)?;
        OrganizationRow {
            name: self.name,
            description: self.description,
            status: self.status,
            member_count: self.member_count,
            advisor_name: self.advisor_name,
            advisor_account_id: self.advisor_account_id,
            advisor_email: self.advisor_email,
            chair_name: self.chair_name,
            chair_account_id: self.chair_account_id,
            chair_email: self.chair_email,
            secretary_name: self.secretary_name,
            secretary_account_id: self.secretary_account_id,
            secretary_email: self.secretary_email,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_organization(id)
    }
}

impl OrganizationRow {
    fn into_organization(self, id: Uuid) -> Result<Organization, DbError> {
        Ok(Organization {
            id,
            name: self.name,
            description: self.description,
            status: parse_status(&self.status)?,
            member_count: self.member_count,
            advisor: slot_from_columns(
                self.advisor_name,
                self.advisor_account_id,
                self.advisor_email,
            )?,
            chair: slot_from_columns(self.chair_name, self.chair_account_id, self.chair_email)?,
            secretary: slot_from_columns(
                self.secretary_name,
                self.secretary_account_id,
                self.secretary_email,
            )?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn parse_uuid(s: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))
}

fn parse_status(s: &str) -> Result<OrganizationStatus, DbError> {
    match s {
        "Active" => Ok(OrganizationStatus::Active),
        "Inactive" => Ok(OrganizationStatus::Inactive),
        other => Err(DbError::Corrupt(format!(
            "unknown organization status: {other}"
        ))),
    }
}

/// A slot exists once it has a display name; account and email columns
/// without a name are ignored.
fn slot_from_columns(
    name: Option<String>,
    account_id: Option<String>,
    email: Option<String>,
) -> Result<Option<RoleSlot>, DbError> {
    let Some(display_name) = name else {
        return Ok(None);
    };
    let linked_account_id = account_id.as_deref().map(parse_uuid).transpose()?;
    Ok(Some(RoleSlot {
        display_name,
        linked_account_id,
        contact_email: email,
    }))
}

struct SlotColumns {
    name: &'static str,
    account_id: &'static str,
    email: &'static str,
}

fn slot_columns(role: SlotRole) -> SlotColumns {
    match role {
        SlotRole::Advisor => SlotColumns {
            name: "advisor_name",
            account_id: "advisor_account_id",
            email: "advisor_email",
        },
        SlotRole::Chair => SlotColumns {
            name: "chair_name",
            account_id: "chair_account_id",
            email: "chair_email",
        },
        SlotRole::Secretary => SlotColumns {
            name: "secretary_name",
            account_id: "secretary_account_id",
            email: "secretary_email",
        },
    }
}

/// Column/value pairs for a merge-update, in a stable order.
fn merge_assignments(input: UpdateOrganization) -> Vec<(&'static str, String)> {
    let mut out = Vec::new();
    if let Some(name) = input.name.clone() {
        out.push(("name", name));
    }
    if let Some(description) = input.description.clone() {
        out.push(("description", description));
    }
    if let Some(status) = input.status {
        out.push(("status", status.as_str().to_string()));
    }
    for role in SlotRole::ALL {
        let Some(slot) = input.slot(role) else {
            continue;
        };
        let columns = slot_columns(role);
        if let Some(name) = &slot.display_name {
            out.push((columns.name, name.clone()));
        }
        if let Some(account_id) = slot.linked_account_id {
            out.push((columns.account_id, account_id.to_string()));
        }
        if let Some(email) = &slot.contact_email {
            out.push((columns.email, email.clone()));
        }
    }
    out
}

/// SurrealDB implementation of the Organization repository.
#[derive(Clone)]
pub struct SurrealOrganizationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOrganizationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> OrganizationRepository for SurrealOrganizationRepository<C> {
    async fn create(&self, input: CreateOrganization) -> UkmResult<Organization> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('organization', $id) SET \
                 name = $name, description = $description, \
                 status = $status, member_count = 0",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .bind(("status", input.status.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: id_str,
        })?;

        Ok(row.into_organization(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> UkmResult<Organization> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('organization', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: id_str,
        })?;

        Ok(row.into_organization(id)?)
    }

    async fn find_by_name(&self, name: &str) -> UkmResult<Vec<Organization>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM organization \
                 WHERE name = $name ORDER BY created_at ASC",
            )
            .bind(("name", name.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_organization())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }

    async fn list(&self) -> UkmResult<Vec<Organization>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM organization \
                 ORDER BY created_at ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_organization())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }

    async fn update(&self, id: Uuid, input: UpdateOrganization) -> UkmResult<Organization> {
        let id_str = id.to_string();
        let assignments = merge_assignments(input);

        let mut sets: Vec<String> = assignments
            .iter()
            .map(|(column, _)| format!("{column} = ${column}"))
            .collect();
        sets.push("updated_at = time::now()".into());

        let query = format!(
            "UPDATE type::record('organization', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));
        for (column, value) in assignments {
            builder = builder.bind((column, value));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: id_str,
        })?;

        Ok(row.into_organization(id)?)
    }

    async fn increment_member_count(&self, id: Uuid, delta: i64) -> UkmResult<Organization> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('organization', $id) SET \
                 member_count += $delta, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("delta", delta))
            .await
            .map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: id_str,
        })?;

        Ok(row.into_organization(id)?)
    }

    async fn delete(&self, id: Uuid) -> UkmResult<()> {
        self.db
            .query("DELETE type::record('organization', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ukm_core::models::organization::RoleSlotUpdate;

    #[test]
    fn merge_assignments_only_lists_supplied_fields() {
        let account = Uuid::new_v4();
        let input = UpdateOrganization {
            description: Some("Robots".into()),
            chair: Some(RoleSlotUpdate::linked(
                "Budi".into(),
                account,
                "budi@example.com".into(),
            )),
            ..Default::default()
        };

        let columns: Vec<&str> = merge_assignments(input)
            .into_iter()
            .map(|(c, _)| c)
            .collect();
        assert_eq!(
            columns,
            vec!["description", "chair_name", "chair_account_id", "chair_email"]
        );
    }

    #[test]
    fn nameless_slot_columns_are_ignored() {
        let slot = slot_from_columns(None, Some(Uuid::new_v4().to_string()), None).unwrap();
        assert!(slot.is_none());
    }

    #[test]
    fn display_only_slot_has_no_account() {
        let slot = slot_from_columns(Some("Dr. Sari".into()), None, None)
            .unwrap()
            .unwrap();
        assert_eq!(slot.display_name, "Dr. Sari");
        assert!(!slot.is_linked());
    }
}

//! Schema definitions and migration runner for SurrealDB.
//!
//! Tables are SCHEMAFULL. UUIDs are stored as strings and enums as
//! strings guarded by ASSERT constraints. Role slots are flattened into
//! `<role>_name`, `<role>_account_id` and `<role>_email` columns so a
//! merge-update can touch one slot field without rewriting the others.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "document_store",
        sql: SCHEMA_V1,
    },
    Migration {
        version: 2,
        name: "identity_service",
        sql: SCHEMA_V2,
    },
];

// -----------------------------------------------------------------------
// Schema v1 — organizations and member accounts
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Organizations
-- =======================================================================
DEFINE TABLE organization SCHEMAFULL;
DEFINE FIELD name ON TABLE organization TYPE string;
DEFINE FIELD description ON TABLE organization TYPE string DEFAULT '';
DEFINE FIELD status ON TABLE organization TYPE string \
    ASSERT $value IN ['Active', 'Inactive'];
DEFINE FIELD member_count ON TABLE organization TYPE int DEFAULT 0 \
    ASSERT $value >= 0;
DEFINE FIELD advisor_name ON TABLE organization TYPE option<string>;
DEFINE FIELD advisor_account_id ON TABLE organization TYPE option<string>;
DEFINE FIELD advisor_email ON TABLE organization TYPE option<string>;
DEFINE FIELD chair_name ON TABLE organization TYPE option<string>;
DEFINE FIELD chair_account_id ON TABLE organization TYPE option<string>;
DEFINE FIELD chair_email ON TABLE organization TYPE option<string>;
DEFINE FIELD secretary_name ON TABLE organization TYPE option<string>;
DEFINE FIELD secretary_account_id ON TABLE organization \
    TYPE option<string>;
DEFINE FIELD secretary_email ON TABLE organization TYPE option<string>;
DEFINE FIELD created_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_organization_name ON TABLE organization COLUMNS name;

-- =======================================================================
-- Member accounts (keyed by identity account id)
-- =======================================================================
DEFINE TABLE member_account SCHEMAFULL;
DEFINE FIELD display_name ON TABLE member_account TYPE string;
DEFINE FIELD email ON TABLE member_account TYPE string;
DEFINE FIELD role ON TABLE member_account TYPE string \
    ASSERT $value IN ['admin', 'advisor', 'chair', 'secretary', \
    'student', 'pending_verifier'];
DEFINE FIELD organization_id ON TABLE member_account TYPE option<string>;
DEFINE FIELD organization_name ON TABLE member_account \
    TYPE option<string>;
DEFINE FIELD faculty ON TABLE member_account TYPE option<string>;
DEFINE FIELD department ON TABLE member_account TYPE option<string>;
DEFINE FIELD email_verified ON TABLE member_account TYPE bool \
    DEFAULT false;
DEFINE FIELD created_at ON TABLE member_account TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE member_account TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_member_role_org ON TABLE member_account \
    COLUMNS role, organization_id;
";

// -----------------------------------------------------------------------
// Schema v2 — identity accounts and verification outbox
// -----------------------------------------------------------------------

const SCHEMA_V2: &str = "\
DEFINE TABLE identity_account SCHEMAFULL;
DEFINE FIELD email ON TABLE identity_account TYPE string;
DEFINE FIELD password_hash ON TABLE identity_account TYPE string;
DEFINE FIELD email_verified ON TABLE identity_account TYPE bool \
    DEFAULT false;
DEFINE FIELD created_at ON TABLE identity_account TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE identity_account TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_identity_email ON TABLE identity_account \
    COLUMNS email UNIQUE;

-- Append-only: delivery is handled outside the system.
DEFINE TABLE email_verification SCHEMAFULL
    PERMISSIONS
        FOR create FULL
        FOR select FULL
        FOR update NONE
        FOR delete NONE;
DEFINE FIELD account_id ON TABLE email_verification TYPE string;
DEFINE FIELD email ON TABLE email_verification TYPE string;
DEFINE FIELD callback_url ON TABLE email_verification TYPE string;
DEFINE FIELD requested_at ON TABLE email_verification TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_verification_account ON TABLE email_verification \
    COLUMNS account_id, requested_at;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates the `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the recorded maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in pending(current_version) {
        apply(db, migration).await?;
    }

    Ok(())
}

fn pending(current_version: u32) -> impl Iterator<Item = &'static Migration> {
    MIGRATIONS
        .iter()
        .filter(move |m| m.version > current_version)
}

async fn apply<C: Connection>(db: &Surreal<C>, migration: &Migration) -> Result<(), DbError> {
    info!(
        version = migration.version,
        name = migration.name,
        "Applying migration"
    );

    db.query(migration.sql).await?.check().map_err(|e| {
        DbError::Migration(format!(
            "v{} '{}' failed: {}",
            migration.version, migration.name, e,
        ))
    })?;

    db.query("CREATE _migration SET version = $version, name = $name")
        .bind(("version", migration.version))
        .bind(("name", migration.name))
        .await?
        .check()
        .map_err(|e| {
            DbError::Migration(format!(
                "could not record v{}: {}",
                migration.version, e,
            ))
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }

    #[test]
    fn pending_skips_applied_versions() {
        let versions: Vec<u32> = pending(1).map(|m| m.version).collect();
        assert_eq!(versions, vec![2]);
        assert_eq!(pending(0).count(), MIGRATIONS.len());
        assert_eq!(pending(2).count(), 0);
    }

    #[test]
    fn every_slot_has_three_columns() {
        for role in ["advisor", "chair", "secretary"] {
            for suffix in ["name", "account_id", "email"] {
                let column = format!("DEFINE FIELD {role}_{suffix} ON TABLE organization");
                assert!(SCHEMA_V1.contains(&column), "missing {column}");
            }
        }
    }
}

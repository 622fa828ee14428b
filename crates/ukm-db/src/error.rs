//! Database-specific error types and conversions.

use ukm_core::error::UkmError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query rejected: {0}")]
    Query(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl From<DbError> for UkmError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => UkmError::NotFound { entity, id },
            other => UkmError::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_keeps_entity_and_id() {
        let err: UkmError = DbError::NotFound {
            entity: "organization".into(),
            id: "abc".into(),
        }
        .into();
        assert!(matches!(
            err,
            UkmError::NotFound { ref entity, ref id } if entity == "organization" && id == "abc"
        ));
    }

    #[test]
    fn other_errors_become_database_errors() {
        let err: UkmError = DbError::Query("index violation".into()).into();
        assert!(matches!(err, UkmError::Database(msg) if msg.contains("index violation")));
    }
}

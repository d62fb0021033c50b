use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure taxonomy for every entity-store operation. Mutations either fully
/// apply or return one of these with state untouched.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A referenced entity does not exist
    #[error("{0} not found")]
    NotFound(&'static str),
    /// A value fails a domain rule (short title, self-follow)
    #[error("{0}")]
    InvalidInput(String),
    /// A uniqueness or duplicate-association rule was violated
    #[error("{0}")]
    Conflict(String),
    /// Unclassified storage fault
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        // Constraint violations are how the storage engine resolves races the
        // duplicate guards could not see; the loser must observe a Conflict.
        match err {
            rusqlite::Error::SqliteFailure(e, msg)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::Conflict(
                    msg.unwrap_or_else(|| "uniqueness constraint violated".to_string()),
                )
            }
            other => StoreError::Internal(other.into()),
        }
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(err: r2d2::Error) -> Self {
        StoreError::Internal(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_violation_maps_to_conflict() {
        let conn = rusqlite::Connection::open_in_memory().expect("Failed to open connection");
        conn.execute_batch("CREATE TABLE t (x TEXT UNIQUE)")
            .expect("Failed to create table");
        conn.execute("INSERT INTO t (x) VALUES ('a')", [])
            .expect("First insert should succeed");

        let err = conn
            .execute("INSERT INTO t (x) VALUES ('a')", [])
            .expect_err("Duplicate insert should fail");

        assert!(matches!(StoreError::from(err), StoreError::Conflict(_)));
    }

    #[test]
    fn test_other_sqlite_errors_map_to_internal() {
        let conn = rusqlite::Connection::open_in_memory().expect("Failed to open connection");
        let err = conn
            .execute("INSERT INTO missing (x) VALUES (1)", [])
            .expect_err("Insert into missing table should fail");

        assert!(matches!(StoreError::from(err), StoreError::Internal(_)));
    }
}

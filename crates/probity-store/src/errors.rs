//! Error handling for probity-store
//!
//! Wraps probity-core ExError with store-specific helpers

use probity_core::errors::{ExError, ExErrorKind};
use rusqlite::ffi;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// True for UNIQUE and PRIMARY KEY violations
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => matches!(
            e.extended_code,
            ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        ),
        _ => false,
    }
}

/// Classify a failed snapshot write
///
/// Inside a snapshot statement the only unique keys that can collide are
/// `(source_id, snapshot_id)` on entity tables and the key pair on junction
/// tables, so a uniqueness failure means "already snapshotted under this
/// id". Every other failure is fatal.
pub fn snapshot_write_error(op: &str, err: rusqlite::Error) -> ExError {
    if is_unique_violation(&err) {
        ExError::new(ExErrorKind::Conflict)
            .with_op(op.to_string())
            .with_message(format!("rows already exist under this snapshot id: {}", err))
    } else {
        ExError::new(ExErrorKind::Persistence)
            .with_op(op.to_string())
            .with_message(err.to_string())
    }
}

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: recorded {}, embedded {}",
            migration_id, expected, actual
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_unique_violation_is_conflict() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (a TEXT, b TEXT, UNIQUE (a, b)); INSERT INTO t VALUES ('x', 'y');")
            .unwrap();
        let err = conn
            .execute("INSERT INTO t VALUES ('x', 'y')", [])
            .unwrap_err();
        assert!(is_unique_violation(&err));
        assert_eq!(snapshot_write_error("copy", err).kind(), ExErrorKind::Conflict);
    }

    #[test]
    fn test_other_constraint_is_persistence() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (a TEXT NOT NULL);").unwrap();
        let err = conn.execute("INSERT INTO t VALUES (NULL)", []).unwrap_err();
        assert!(!is_unique_violation(&err));
        assert_eq!(
            snapshot_write_error("copy", err).kind(),
            ExErrorKind::Persistence
        );
    }
}

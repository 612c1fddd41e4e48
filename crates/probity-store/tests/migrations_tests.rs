//! Migrations against a database file

use probity_store::db;
use probity_store::migrations::{applied_migrations, get_migrations};
use tempfile::TempDir;

#[test]
fn test_reopening_a_migrated_file_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("probity.db");

    {
        let conn = db::open_and_migrate(&path).unwrap();
        assert_eq!(applied_migrations(&conn).unwrap().len(), get_migrations().len());
    }

    let conn = db::open_and_migrate(&path).unwrap();
    let applied = applied_migrations(&conn).unwrap();
    let expected: Vec<String> = get_migrations().iter().map(|m| m.id.to_string()).collect();
    assert_eq!(applied, expected);
}

#[test]
fn test_schema_rejects_live_row_with_source() {
    let dir = TempDir::new().unwrap();
    let conn = db::open_and_migrate(dir.path().join("probity.db")).unwrap();
    conn.execute(
        "INSERT INTO organizations (id, tenant_id, name, created_at, updated_at) VALUES ('o', '0101010101010101', 'O', 0, 0)",
        [],
    )
    .unwrap();

    let result = conn.execute(
        "INSERT INTO risks (id, tenant_id, organization_id, name, source_id, created_at, updated_at)
         VALUES ('r', '0101010101010101', 'o', 'R', 'other', 0, 0)",
        [],
    );
    assert!(result.is_err());
}

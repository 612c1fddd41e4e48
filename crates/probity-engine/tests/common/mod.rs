#![allow(dead_code)]

use probity_store::{db, Scope};
use rusqlite::{params, Connection};
use tempfile::TempDir;

pub const TENANT: &str = "0a0a0a0a0a0a0a0a";
pub const ORG: &str = "org_eng";

pub fn scope() -> Scope {
    Scope::new(TENANT.parse().unwrap())
}

/// File-backed database so immediate/exclusive locking is exercised
pub fn setup() -> (TempDir, Connection) {
    let dir = TempDir::new().unwrap();
    let conn = db::open_and_migrate(dir.path().join("engine.db")).unwrap();
    conn.execute(
        "INSERT INTO organizations (id, tenant_id, name, created_at, updated_at) VALUES (?, ?, 'Engine Org', 0, 0)",
        params![ORG, TENANT],
    )
    .unwrap();
    (dir, conn)
}

pub fn seed_processing_graph(conn: &Connection) {
    conn.execute_batch(&format!(
        "INSERT INTO processing_activities (id, tenant_id, organization_id, name, purpose, created_at, updated_at)
             VALUES ('pa1', '{TENANT}', '{ORG}', 'Payroll', 'Pay staff', 10, 20);
         INSERT INTO vendors (id, tenant_id, organization_id, name, created_at, updated_at)
             VALUES ('v1', '{TENANT}', '{ORG}', 'PayCo', 10, 20);
         INSERT INTO vendors (id, tenant_id, organization_id, name, created_at, updated_at)
             VALUES ('v2', '{TENANT}', '{ORG}', 'BankCo', 10, 20);
         INSERT INTO processing_activity_vendors (processing_activity_id, vendor_id, tenant_id, organization_id, created_at)
             VALUES ('pa1', 'v1', '{TENANT}', '{ORG}', 30);
         INSERT INTO processing_activity_vendors (processing_activity_id, vendor_id, tenant_id, organization_id, created_at)
             VALUES ('pa1', 'v2', '{TENANT}', '{ORG}', 30);"
    ))
    .unwrap();
}

pub fn count(conn: &Connection, sql: &str) -> i64 {
    conn.query_row(sql, [], |r| r.get(0)).unwrap()
}

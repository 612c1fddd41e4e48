//! Shared fixtures for store integration tests
//!
//! Live rows are seeded with raw SQL; CRUD for live entities is not part of
//! the store.

#![allow(dead_code)]

use probity_core::errors::ExError;
use probity_core::model::{Snapshot, SnapshotKind};
use probity_core::policy::OrphanPolicy;
use probity_store::db;
use probity_store::migrations::apply_migrations;
use probity_store::snapshot::{insert_snapshot_header, Coordinator, SnapshotReport};
use probity_store::{Scope, TenantScope, UnitOfWork};
use rusqlite::{params, Connection, TransactionBehavior};

pub const TENANT_A: &str = "0101010101010101";
pub const TENANT_B: &str = "0202020202020202";
pub const ORG: &str = "org_a";
pub const OTHER_ORG: &str = "org_b";

pub const CREATED_AT: i64 = 1_700_000_000_000;
pub const UPDATED_AT: i64 = 1_700_000_500_000;

pub fn setup() -> Connection {
    let mut conn = db::open_in_memory().unwrap();
    apply_migrations(&mut conn).unwrap();
    seed_org(&conn, TENANT_A, ORG);
    conn
}

pub fn scope(tenant: &str) -> Scope {
    Scope::new(tenant.parse().unwrap())
}

pub fn seed_org(conn: &Connection, tenant: &str, id: &str) {
    conn.execute(
        "INSERT INTO organizations (id, tenant_id, name, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        params![id, tenant, format!("Org {id}"), CREATED_AT, CREATED_AT],
    )
    .unwrap();
}

pub fn seed_asset(conn: &Connection, tenant: &str, org: &str, id: &str, name: &str) {
    conn.execute(
        "INSERT INTO assets (id, tenant_id, organization_id, name, amount, owner_id, asset_type, data_types_stored, created_at, updated_at)
         VALUES (?, ?, ?, ?, 3, 'people_1', 'PHYSICAL', 'customer records', ?, ?)",
        params![id, tenant, org, name, CREATED_AT, UPDATED_AT],
    )
    .unwrap();
}

pub fn seed_vendor(conn: &Connection, tenant: &str, org: &str, id: &str, name: &str) {
    conn.execute(
        "INSERT INTO vendors (id, tenant_id, organization_id, name, category, website_url, show_on_trust_center, created_at, updated_at)
         VALUES (?, ?, ?, ?, 'CLOUD_PROVIDER', 'https://vendor.example', 1, ?, ?)",
        params![id, tenant, org, name, CREATED_AT, UPDATED_AT],
    )
    .unwrap();
}

pub fn seed_vendor_contact(conn: &Connection, tenant: &str, org: &str, id: &str, vendor_id: &str) {
    conn.execute(
        "INSERT INTO vendor_contacts (id, tenant_id, organization_id, vendor_id, full_name, email, created_at, updated_at)
         VALUES (?, ?, ?, ?, 'Ada Contact', 'ada@vendor.example', ?, ?)",
        params![id, tenant, org, vendor_id, CREATED_AT, UPDATED_AT],
    )
    .unwrap();
}

pub fn seed_risk(conn: &Connection, tenant: &str, org: &str, id: &str, name: &str) {
    conn.execute(
        "INSERT INTO risks (id, tenant_id, organization_id, name, inherent_likelihood, inherent_impact, created_at, updated_at)
         VALUES (?, ?, ?, ?, 4, 5, ?, ?)",
        params![id, tenant, org, name, CREATED_AT, UPDATED_AT],
    )
    .unwrap();
}

pub fn link_asset_vendor(conn: &Connection, tenant: &str, org: &str, asset_id: &str, vendor_id: &str) {
    conn.execute(
        "INSERT INTO asset_vendors (asset_id, vendor_id, tenant_id, organization_id, created_at)
         VALUES (?, ?, ?, ?, ?)",
        params![asset_id, vendor_id, tenant, org, CREATED_AT],
    )
    .unwrap();
}

pub fn row_count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
        .unwrap()
}

/// Header plus coordinator in one transaction; committed only on success
pub fn take_snapshot(
    conn: &mut Connection,
    tenant: &str,
    snapshot_id: &str,
    kind: SnapshotKind,
    orphans: OrphanPolicy,
) -> Result<SnapshotReport, ExError> {
    let scope = scope(tenant);
    let uow = UnitOfWork::begin(conn, TransactionBehavior::Immediate)?;
    let header = Snapshot::new(snapshot_id, ORG, scope.tenant_id(), "audit", kind);
    insert_snapshot_header(&uow, &scope, &header)?;
    let report = Coordinator::for_kind(kind, orphans)?.snapshot(&uow, &scope, ORG, snapshot_id)?;
    uow.commit()?;
    Ok(report)
}


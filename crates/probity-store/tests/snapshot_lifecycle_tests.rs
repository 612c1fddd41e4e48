//! Listing, deletion and cancellation of whole snapshots

mod common;

use common::*;
use probity_core::errors::ExErrorKind;
use probity_core::model::{Collection, Snapshot, SnapshotKind, SnapshotSelector};
use probity_core::policy::OrphanPolicy;
use probity_store::snapshot::{
    count_rows, delete_snapshot, get_snapshot, insert_snapshot_header, list_snapshots, Coordinator,
};
use probity_store::{CancellationToken, TenantScope, UnitOfWork};
use rusqlite::TransactionBehavior;

fn seed_assets_graph(conn: &rusqlite::Connection) {
    seed_asset(conn, TENANT_A, ORG, "a1", "Laptop fleet");
    seed_asset(conn, TENANT_A, ORG, "a2", "Build servers");
    seed_vendor(conn, TENANT_A, ORG, "v1", "CloudCo");
    link_asset_vendor(conn, TENANT_A, ORG, "a1", "v1");
    link_asset_vendor(conn, TENANT_A, ORG, "a2", "v1");
}

#[test]
fn test_header_round_trips() {
    let mut conn = setup();
    take_snapshot(&mut conn, TENANT_A, "s1", SnapshotKind::Assets, OrphanPolicy::Prune).unwrap();

    let header = get_snapshot(&conn, &scope(TENANT_A), ORG, "s1").unwrap().unwrap();
    assert_eq!(header.kind, SnapshotKind::Assets);
    assert_eq!(header.name, "audit");
    assert_eq!(header.tenant_id.to_string(), TENANT_A);
    assert!(get_snapshot(&conn, &scope(TENANT_A), ORG, "nope").unwrap().is_none());
}

#[test]
fn test_list_snapshots_oldest_first() {
    let mut conn = setup();
    let scope = scope(TENANT_A);
    {
        let uow = UnitOfWork::begin(&mut conn, TransactionBehavior::Immediate).unwrap();
        for (id, offset) in [("late", 2_000), ("early", 1_000)] {
            let mut header = Snapshot::new(id, ORG, scope.tenant_id(), id, SnapshotKind::Risks)
                .with_description("quarterly");
            header.created_at = chrono::DateTime::from_timestamp_millis(CREATED_AT + offset).unwrap();
            insert_snapshot_header(&uow, &scope, &header).unwrap();
        }
        uow.commit().unwrap();
    }

    let listed = list_snapshots(&conn, &scope, ORG).unwrap();
    let ids: Vec<&str> = listed.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["early", "late"]);
    assert_eq!(listed[0].description.as_deref(), Some("quarterly"));
}

#[test]
fn test_delete_removes_only_that_snapshot() {
    let mut conn = setup();
    seed_assets_graph(&conn);
    take_snapshot(&mut conn, TENANT_A, "s1", SnapshotKind::Assets, OrphanPolicy::Prune).unwrap();
    take_snapshot(&mut conn, TENANT_A, "s2", SnapshotKind::Assets, OrphanPolicy::Prune).unwrap();

    let scope = scope(TENANT_A);
    let report = {
        let uow = UnitOfWork::begin(&mut conn, TransactionBehavior::Immediate).unwrap();
        let report = delete_snapshot(&uow, &scope, ORG, "s1").unwrap();
        uow.commit().unwrap();
        report
    };
    // 2 assets + 1 vendor + 2 links
    assert_eq!(report.rows_deleted(), 5);
    assert_eq!(report.stages[0].0, Collection::AssetVendors);

    let in_s1 = SnapshotSelector::exactly("s1");
    let in_s2 = SnapshotSelector::exactly("s2");
    for c in [Collection::Assets, Collection::Vendors, Collection::AssetVendors] {
        assert_eq!(count_rows(&conn, &scope, c, ORG, &in_s1).unwrap(), 0, "{c}");
        assert!(count_rows(&conn, &scope, c, ORG, &in_s2).unwrap() > 0, "{c}");
    }
    assert_eq!(count_rows(&conn, &scope, Collection::Assets, ORG, &SnapshotSelector::LiveOnly).unwrap(), 2);
    assert_eq!(count_rows(&conn, &scope, Collection::AssetVendors, ORG, &SnapshotSelector::LiveOnly).unwrap(), 2);
    assert!(get_snapshot(&conn, &scope, ORG, "s1").unwrap().is_none());
}

#[test]
fn test_delete_unknown_snapshot_is_not_found() {
    let mut conn = setup();
    let scope = scope(TENANT_A);
    let uow = UnitOfWork::begin(&mut conn, TransactionBehavior::Immediate).unwrap();
    let err = delete_snapshot(&uow, &scope, ORG, "missing").unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
}

#[test]
fn test_cancelled_snapshot_stops_before_next_stage() {
    let mut conn = setup();
    seed_assets_graph(&conn);
    let scope = scope(TENANT_A);
    let token = CancellationToken::new();
    token.cancel();

    let uow = UnitOfWork::begin(&mut conn, TransactionBehavior::Immediate)
        .unwrap()
        .with_cancellation(token);
    let err = Coordinator::for_kind(SnapshotKind::Assets, OrphanPolicy::Prune)
        .unwrap()
        .snapshot(&uow, &scope, ORG, "s1")
        .unwrap_err();
    drop(uow);

    assert_eq!(err.kind(), ExErrorKind::Cancelled);
    assert_eq!(err.stage(), Some("assets"));
    assert_eq!(row_count(&conn, "assets"), 2);
}

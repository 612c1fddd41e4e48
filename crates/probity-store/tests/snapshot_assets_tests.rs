//! Assets aggregate: entity copies, junction remapping and conflicts

mod common;

use common::*;
use probity_core::errors::ExErrorKind;
use probity_core::model::{Collection, EntityType, Gid, SnapshotKind, SnapshotSelector};
use probity_core::policy::OrphanPolicy;
use probity_store::snapshot::{list_links, EntitySnapshotter, JunctionSnapshotter, Snapshotter};
use probity_store::UnitOfWork;
use rusqlite::{params, TransactionBehavior};

fn seed_linked_pair(conn: &rusqlite::Connection) {
    seed_asset(conn, TENANT_A, ORG, "a1", "Laptop fleet");
    seed_vendor(conn, TENANT_A, ORG, "v1", "CloudCo");
    link_asset_vendor(conn, TENANT_A, ORG, "a1", "v1");
}

#[test]
fn test_assets_snapshot_copies_entities_and_remaps_junction() {
    let mut conn = setup();
    seed_linked_pair(&conn);

    let report = take_snapshot(&mut conn, TENANT_A, "s1", SnapshotKind::Assets, OrphanPolicy::Prune).unwrap();
    assert_eq!(report.rows_inserted(), 3);
    assert_eq!(report.rows_dropped(), 0);
    assert_eq!(report.stage(Collection::AssetVendors).unwrap().rows_inserted, 1);

    let (asset_copy, asset_source): (String, String) = conn
        .query_row(
            "SELECT id, source_id FROM assets WHERE snapshot_id = 's1'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    let (vendor_copy, vendor_source): (String, String) = conn
        .query_row(
            "SELECT id, source_id FROM vendors WHERE snapshot_id = 's1'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(asset_source, "a1");
    assert_eq!(vendor_source, "v1");

    let links = list_links(
        &conn,
        &scope(TENANT_A),
        Collection::AssetVendors,
        ORG,
        &SnapshotSelector::exactly("s1"),
    )
    .unwrap();
    assert_eq!(links, vec![(asset_copy.clone(), vendor_copy.clone())]);

    // Copy ids are fresh identities of the right type and tenant
    let gid: Gid = asset_copy.parse().unwrap();
    assert_eq!(gid.entity_type().unwrap(), EntityType::Asset);
    assert_eq!(gid.tenant_id().to_string(), TENANT_A);
    let gid: Gid = vendor_copy.parse().unwrap();
    assert_eq!(gid.entity_type().unwrap(), EntityType::Vendor);

    // Live rows are untouched
    assert_eq!(row_count(&conn, "assets"), 2);
    let live_link: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM asset_vendors WHERE asset_id = 'a1' AND vendor_id = 'v1' AND snapshot_id IS NULL",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(live_link, 1);
}

#[test]
fn test_copy_preserves_every_business_column_and_timestamps() {
    let mut conn = setup();
    seed_linked_pair(&conn);
    take_snapshot(&mut conn, TENANT_A, "s1", SnapshotKind::Assets, OrphanPolicy::Prune).unwrap();

    let select = "SELECT name, amount, owner_id, asset_type, data_types_stored, created_at, updated_at, tenant_id, organization_id FROM assets WHERE ";
    type Row = (String, i64, String, String, String, i64, i64, String, String);
    let read = |r: &rusqlite::Row<'_>| -> rusqlite::Result<Row> {
        Ok((
            r.get(0)?,
            r.get(1)?,
            r.get(2)?,
            r.get(3)?,
            r.get(4)?,
            r.get(5)?,
            r.get(6)?,
            r.get(7)?,
            r.get(8)?,
        ))
    };
    let live = conn
        .query_row(&format!("{select} id = 'a1'"), [], read)
        .unwrap();
    let copy = conn
        .query_row(&format!("{select} snapshot_id = 's1'"), [], read)
        .unwrap();
    assert_eq!(live, copy);
    assert_eq!(copy.5, CREATED_AT);
    assert_eq!(copy.6, UPDATED_AT);
}

#[test]
fn test_repeating_a_snapshot_id_is_a_conflict_and_adds_nothing() {
    let mut conn = setup();
    seed_linked_pair(&conn);

    let scope = scope(TENANT_A);
    {
        let uow = UnitOfWork::begin(&mut conn, TransactionBehavior::Immediate).unwrap();
        probity_store::snapshot::Coordinator::for_kind(SnapshotKind::Assets, OrphanPolicy::Prune)
            .unwrap()
            .snapshot(&uow, &scope, ORG, "s1")
            .unwrap();
        uow.commit().unwrap();
    }
    let before = (row_count(&conn, "assets"), row_count(&conn, "vendors"), row_count(&conn, "asset_vendors"));

    let uow = UnitOfWork::begin(&mut conn, TransactionBehavior::Immediate).unwrap();
    let err = probity_store::snapshot::Coordinator::for_kind(SnapshotKind::Assets, OrphanPolicy::Prune)
        .unwrap()
        .snapshot(&uow, &scope, ORG, "s1")
        .unwrap_err();
    uow.rollback().unwrap();

    assert_eq!(err.kind(), ExErrorKind::Conflict);
    assert_eq!(err.stage(), Some("assets"));
    assert_eq!(err.snapshot_id(), Some("s1"));
    let after = (row_count(&conn, "assets"), row_count(&conn, "vendors"), row_count(&conn, "asset_vendors"));
    assert_eq!(before, after);
}

#[test]
fn test_duplicate_header_is_a_conflict() {
    let mut conn = setup();
    take_snapshot(&mut conn, TENANT_A, "s1", SnapshotKind::Risks, OrphanPolicy::Prune).unwrap();
    let err = take_snapshot(&mut conn, TENANT_A, "s1", SnapshotKind::Risks, OrphanPolicy::Prune).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Conflict);
    assert_eq!(row_count(&conn, "snapshots"), 1);
}

#[test]
fn test_zero_live_rows_is_not_an_error() {
    let mut conn = setup();
    let report = take_snapshot(&mut conn, TENANT_A, "s1", SnapshotKind::Risks, OrphanPolicy::Fail).unwrap();
    assert_eq!(report.stages.len(), 1);
    assert_eq!(report.rows_inserted(), 0);
    assert_eq!(row_count(&conn, "risks"), 0);
}

fn run_asset_stage_then_junction(
    conn: &mut rusqlite::Connection,
    policy: OrphanPolicy,
) -> Result<probity_store::snapshot::StageReport, probity_core::errors::ExError> {
    let scope = scope(TENANT_A);
    let uow = UnitOfWork::begin(conn, TransactionBehavior::Immediate).unwrap();
    EntitySnapshotter::new(Collection::Assets)
        .unwrap()
        .insert_snapshots(&uow, &scope, ORG, "s1")
        .unwrap();
    let result = JunctionSnapshotter::new(Collection::AssetVendors)
        .unwrap()
        .with_orphan_policy(policy)
        .insert_snapshots(&uow, &scope, ORG, "s1");
    if result.is_ok() {
        uow.commit().unwrap();
    }
    result
}

#[test]
fn test_uncopied_endpoint_is_pruned_and_counted() {
    let mut conn = setup();
    seed_linked_pair(&conn);

    let report = run_asset_stage_then_junction(&mut conn, OrphanPolicy::Prune).unwrap();
    assert_eq!(report.rows_inserted, 0);
    assert_eq!(report.rows_dropped, 1);
    let copies: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM asset_vendors WHERE snapshot_id = 's1'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(copies, 0);
}

#[test]
fn test_uncopied_endpoint_fails_under_fail_policy() {
    let mut conn = setup();
    seed_linked_pair(&conn);

    let err = run_asset_stage_then_junction(&mut conn, OrphanPolicy::Fail).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::OrphanedRows);
    assert_eq!(err.stage(), Some("asset_vendors"));
    assert!(err.to_string().contains("1 live rows"));
}

#[test]
fn test_snapshots_with_different_ids_are_independent() {
    let mut conn = setup();
    seed_linked_pair(&conn);

    take_snapshot(&mut conn, TENANT_A, "s1", SnapshotKind::Assets, OrphanPolicy::Prune).unwrap();
    conn.execute("UPDATE assets SET name = 'Renamed' WHERE id = ?", params!["a1"])
        .unwrap();
    take_snapshot(&mut conn, TENANT_A, "s2", SnapshotKind::Assets, OrphanPolicy::Prune).unwrap();

    // Each snapshot holds exactly one copy per live row, sourced from the live row
    for snap in ["s1", "s2"] {
        let (n, source): (i64, String) = conn
            .query_row(
                "SELECT COUNT(*), MAX(source_id) FROM assets WHERE snapshot_id = ?",
                [snap],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(n, 1);
        assert_eq!(source, "a1");
    }
    let names: Vec<String> = {
        let mut stmt = conn
            .prepare("SELECT name FROM assets WHERE snapshot_id IS NOT NULL ORDER BY snapshot_id")
            .unwrap();
        let rows = stmt.query_map([], |r| r.get(0)).unwrap();
        rows.collect::<Result<_, _>>().unwrap()
    };
    assert_eq!(names, vec!["Laptop fleet".to_string(), "Renamed".to_string()]);

    // Junction copies of each snapshot point only at copies of that snapshot
    let crossed: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM asset_vendors j
             JOIN assets a ON a.id = j.asset_id
             JOIN vendors v ON v.id = j.vendor_id
             WHERE j.snapshot_id IS NOT NULL
               AND (a.snapshot_id IS NOT j.snapshot_id OR v.snapshot_id IS NOT j.snapshot_id)",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(crossed, 0);
    assert_eq!(row_count(&conn, "asset_vendors"), 3);
}

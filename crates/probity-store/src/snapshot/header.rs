//! Snapshot header rows

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, is_unique_violation, Result};
use crate::scope::TenantScope;
use crate::snapshot::rows::organization_predicate;
use crate::sql::SqlFragment;
use chrono::{DateTime, TimeZone, Utc};
use probity_core::errors::{ExError, ExErrorKind};
use probity_core::model::{Snapshot, SnapshotKind, TenantId};
use rusqlite::{params_from_iter, Connection, OptionalExtension};

/// Fail with `NotFound` unless the organization exists inside the scope
pub fn ensure_organization(
    conn: &Connection,
    scope: &dyn TenantScope,
    organization_id: &str,
) -> Result<()> {
    let mut q = SqlFragment::new("SELECT 1 FROM organizations AS o WHERE ");
    q.append(SqlFragment::and_all([
        SqlFragment::new("o.id = ?").bind(organization_id.to_string()),
        scope.predicate("o"),
    ]));
    let found = conn
        .query_row(q.sql(), params_from_iter(q.params()), |_| Ok(()))
        .optional()
        .map_err(from_rusqlite)?;
    found.ok_or_else(|| {
        ExError::new(ExErrorKind::NotFound)
            .with_op("ensure_organization")
            .with_organization_id(organization_id)
            .with_message("organization not found")
    })
}

/// Persist a snapshot header
///
/// A header id that already exists is a `Conflict`.
pub fn insert_snapshot_header(
    conn: &Connection,
    scope: &dyn TenantScope,
    snapshot: &Snapshot,
) -> Result<()> {
    snapshot.validate()?;
    if snapshot.tenant_id != scope.tenant_id() {
        return Err(ExError::new(ExErrorKind::InvalidInput)
            .with_op("insert_snapshot_header")
            .with_snapshot_id(snapshot.id.clone())
            .with_message("snapshot tenant differs from the request scope"));
    }
    ensure_organization(conn, scope, &snapshot.organization_id)?;

    conn.execute(
        "INSERT INTO snapshots (id, tenant_id, organization_id, name, description, type, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        rusqlite::params![
            snapshot.id,
            snapshot.tenant_id.to_string(),
            snapshot.organization_id,
            snapshot.name,
            snapshot.description,
            snapshot.kind.as_str(),
            snapshot.created_at.timestamp_millis(),
        ],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            ExError::new(ExErrorKind::Conflict)
                .with_op("insert_snapshot_header")
                .with_snapshot_id(snapshot.id.clone())
                .with_message("snapshot id already exists")
        } else {
            from_rusqlite(e)
        }
    })?;

    Ok(())
}

type HeaderRow = (String, String, String, String, Option<String>, String, i64);

const HEADER_COLUMNS: &str =
    "s.id, s.organization_id, s.tenant_id, s.name, s.description, s.type, s.created_at";

fn read_header(row: &rusqlite::Row<'_>) -> rusqlite::Result<HeaderRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn hydrate((id, organization_id, tenant_id, name, description, kind, created_at): HeaderRow) -> Result<Snapshot> {
    let corrupt = |what: &str| {
        ExError::new(ExErrorKind::Persistence)
            .with_op("load_snapshot")
            .with_snapshot_id(id.clone())
            .with_message(format!("stored header has invalid {what}"))
    };
    let tenant_id: TenantId = tenant_id.parse().map_err(|_| corrupt("tenant_id"))?;
    let kind: SnapshotKind = kind.parse().map_err(|_| corrupt("type"))?;
    let created_at: DateTime<Utc> = Utc
        .timestamp_millis_opt(created_at)
        .single()
        .ok_or_else(|| corrupt("created_at"))?;

    Ok(Snapshot {
        id,
        organization_id,
        tenant_id,
        name,
        description,
        kind,
        created_at,
    })
}

fn header_query(scope: &dyn TenantScope, organization_id: &str) -> SqlFragment {
    let mut q = SqlFragment::new(format!("SELECT {HEADER_COLUMNS} FROM snapshots AS s WHERE "));
    q.append(SqlFragment::and_all([
        organization_predicate("s", organization_id),
        scope.predicate("s"),
    ]));
    q
}

pub fn get_snapshot(
    conn: &Connection,
    scope: &dyn TenantScope,
    organization_id: &str,
    snapshot_id: &str,
) -> Result<Option<Snapshot>> {
    let mut q = header_query(scope, organization_id);
    q.push_bound(" AND (s.id = ?)", snapshot_id.to_string());
    let row = conn
        .query_row(q.sql(), params_from_iter(q.params()), read_header)
        .optional()
        .map_err(from_rusqlite)?;
    row.map(hydrate).transpose()
}

/// Snapshots of one organization, oldest first
pub fn list_snapshots(
    conn: &Connection,
    scope: &dyn TenantScope,
    organization_id: &str,
) -> Result<Vec<Snapshot>> {
    let mut q = header_query(scope, organization_id);
    q.push(" ORDER BY s.created_at, s.id");
    let mut stmt = conn.prepare(q.sql()).map_err(from_rusqlite)?;
    let rows = stmt
        .query_map(params_from_iter(q.params()), read_header)
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;
    rows.into_iter().map(hydrate).collect()
}

pub(crate) fn delete_header(conn: &Connection, scope: &dyn TenantScope, snapshot_id: &str) -> Result<usize> {
    let mut q = SqlFragment::new("DELETE FROM snapshots WHERE ");
    q.append(SqlFragment::and_all([
        SqlFragment::new("snapshots.id = ?").bind(snapshot_id.to_string()),
        scope.predicate("snapshots"),
    ]));
    conn.execute(q.sql(), params_from_iter(q.params()))
        .map_err(from_rusqlite)
}

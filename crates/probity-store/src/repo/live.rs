//! Guarded mutation of live rows
//!
//! Every statement here carries `snapshot_id IS NULL` in its predicate, so
//! a snapshot copy can never be changed or removed through this path. A
//! request that only matches a copy fails with `Immutable`.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use crate::scope::TenantScope;
use crate::snapshot::rows::scoped_rows;
use crate::snapshot::tables::{entity_table, EntityTable};
use crate::sql::SqlFragment;
use probity_core::errors::{ExError, ExErrorKind};
use probity_core::model::{Collection, SnapshotSelector};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension};

fn entity(collection: Collection, op: &str) -> Result<&'static EntityTable> {
    entity_table(collection).ok_or_else(|| {
        ExError::new(ExErrorKind::InvalidInput)
            .with_op(op.to_string())
            .with_message(format!("{collection} is not an entity collection"))
    })
}

fn live_row(
    scope: &dyn TenantScope,
    table: &str,
    organization_id: &str,
    id: &str,
) -> SqlFragment {
    SqlFragment::and_all([
        SqlFragment::new(format!("{table}.id = ?")).bind(id.to_string()),
        scoped_rows(scope, table, organization_id, &SnapshotSelector::LiveOnly),
    ])
}

/// Error for a statement that matched no live row
fn missing_row(
    conn: &Connection,
    scope: &dyn TenantScope,
    collection: Collection,
    organization_id: &str,
    id: &str,
    op: &str,
) -> ExError {
    let table = collection.table();
    let mut q = SqlFragment::new(format!("SELECT 1 FROM {table} WHERE "));
    q.append(SqlFragment::and_all([
        SqlFragment::new(format!("{table}.id = ?")).bind(id.to_string()),
        SqlFragment::new(format!("{table}.snapshot_id IS NOT NULL")),
        scope.predicate(table),
    ]));
    let is_copy = conn
        .query_row(q.sql(), params_from_iter(q.params()), |_| Ok(()))
        .optional();

    let err = match is_copy {
        Ok(Some(())) => ExError::new(ExErrorKind::Immutable)
            .with_message(format!("{table} row belongs to a snapshot and cannot be changed")),
        Ok(None) => ExError::new(ExErrorKind::NotFound).with_message(format!("no live {table} row")),
        Err(e) => from_rusqlite(e),
    };
    err.with_op(op.to_string())
        .with_organization_id(organization_id)
        .with_entity_id(id)
}

/// Set one business column of a live row and bump `updated_at`
pub fn update_live_column(
    conn: &Connection,
    scope: &dyn TenantScope,
    collection: Collection,
    organization_id: &str,
    id: &str,
    column: &str,
    value: Value,
) -> Result<()> {
    const OP: &str = "update_live_column";
    let spec = entity(collection, OP)?;
    if !spec.columns.iter().any(|c| *c == column) {
        return Err(ExError::new(ExErrorKind::InvalidInput)
            .with_op(OP)
            .with_message(format!("{column} is not a business column of {collection}")));
    }

    let table = collection.table();
    let mut q = SqlFragment::new(format!("UPDATE {table} SET {column} = ?, updated_at = ? WHERE "))
        .bind(value)
        .bind(chrono::Utc::now().timestamp_millis());
    q.append(live_row(scope, table, organization_id, id));

    let updated = conn
        .execute(q.sql(), params_from_iter(q.params()))
        .map_err(|e| from_rusqlite(e).with_op(OP))?;
    if updated == 0 {
        return Err(missing_row(conn, scope, collection, organization_id, id, OP));
    }
    Ok(())
}

/// Delete one live row
pub fn delete_live_row(
    conn: &Connection,
    scope: &dyn TenantScope,
    collection: Collection,
    organization_id: &str,
    id: &str,
) -> Result<()> {
    const OP: &str = "delete_live_row";
    entity(collection, OP)?;

    let table = collection.table();
    let mut q = SqlFragment::new(format!("DELETE FROM {table} WHERE "));
    q.append(live_row(scope, table, organization_id, id));

    let deleted = conn
        .execute(q.sql(), params_from_iter(q.params()))
        .map_err(|e| from_rusqlite(e).with_op(OP))?;
    if deleted == 0 {
        return Err(missing_row(conn, scope, collection, organization_id, id, OP));
    }
    Ok(())
}

//! Read-only listing over snapshot-aware tables

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use crate::filter::nullable_predicate;
use crate::scope::TenantScope;
use crate::snapshot::rows::scoped_rows;
use crate::snapshot::tables::junction_table;
use crate::sql::SqlFragment;
use probity_core::errors::{ExError, ExErrorKind};
use probity_core::model::{Collection, NullableFilter, SnapshotSelector};
use rusqlite::{params_from_iter, Connection};

/// Which rows of an entity collection to return
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowFilter {
    pub snapshot: SnapshotSelector,
    pub source_id: NullableFilter<String>,
}

impl RowFilter {
    pub fn live() -> Self {
        Self::default()
    }

    pub fn in_snapshot(snapshot_id: impl Into<String>) -> Self {
        Self {
            snapshot: SnapshotSelector::exactly(snapshot_id),
            source_id: NullableFilter::Any,
        }
    }

    /// Every copy of one live row, across all snapshots
    pub fn copies_of(source_id: impl Into<String>) -> Self {
        Self {
            snapshot: SnapshotSelector::Unconstrained,
            source_id: NullableFilter::Equals(source_id.into()),
        }
    }
}

fn where_clause(
    scope: &dyn TenantScope,
    organization_id: &str,
    filter: &RowFilter,
) -> SqlFragment {
    SqlFragment::and_all([
        scoped_rows(scope, "t", organization_id, &filter.snapshot),
        nullable_predicate(&filter.source_id, "t.source_id"),
    ])
}

/// Ids of entity rows matching `filter`, sorted
pub fn list_entity_ids(
    conn: &Connection,
    scope: &dyn TenantScope,
    collection: Collection,
    organization_id: &str,
    filter: &RowFilter,
) -> Result<Vec<String>> {
    if collection.is_junction() {
        return Err(ExError::new(ExErrorKind::InvalidInput)
            .with_op("list_entity_ids")
            .with_message(format!("{collection} has no row ids; use list_links")));
    }
    let mut q = SqlFragment::new(format!("SELECT t.id FROM {} AS t WHERE ", collection.table()));
    q.append(where_clause(scope, organization_id, filter));
    q.push(" ORDER BY t.id");

    let mut stmt = conn.prepare(q.sql()).map_err(from_rusqlite)?;
    let ids = stmt
        .query_map(params_from_iter(q.params()), |row| row.get(0))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<String>, _>>()
        .map_err(from_rusqlite)?;
    Ok(ids)
}

/// Number of rows of any collection under one snapshot selector
pub fn count_rows(
    conn: &Connection,
    scope: &dyn TenantScope,
    collection: Collection,
    organization_id: &str,
    selector: &SnapshotSelector,
) -> Result<usize> {
    let mut q = SqlFragment::new(format!("SELECT COUNT(*) FROM {} AS t WHERE ", collection.table()));
    q.append(scoped_rows(scope, "t", organization_id, selector));
    let n: i64 = conn
        .query_row(q.sql(), params_from_iter(q.params()), |row| row.get(0))
        .map_err(from_rusqlite)?;
    Ok(n as usize)
}

/// Key pairs of a junction collection, sorted
pub fn list_links(
    conn: &Connection,
    scope: &dyn TenantScope,
    collection: Collection,
    organization_id: &str,
    selector: &SnapshotSelector,
) -> Result<Vec<(String, String)>> {
    let table = junction_table(collection).ok_or_else(|| {
        ExError::new(ExErrorKind::InvalidInput)
            .with_op("list_links")
            .with_message(format!("{collection} is not a junction collection"))
    })?;
    let mut q = SqlFragment::new(format!(
        "SELECT t.{l}, t.{r} FROM {table} AS t WHERE ",
        l = table.left.column,
        r = table.right.column,
        table = collection.table()
    ));
    q.append(scoped_rows(scope, "t", organization_id, selector));
    q.push(&format!(
        " ORDER BY t.{}, t.{}",
        table.left.column, table.right.column
    ));

    let mut stmt = conn.prepare(q.sql()).map_err(from_rusqlite)?;
    let links = stmt
        .query_map(params_from_iter(q.params()), |row| Ok((row.get(0)?, row.get(1)?)))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;
    Ok(links)
}

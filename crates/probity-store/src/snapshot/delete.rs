//! Snapshot deletion
//!
//! Removes every copy tagged with one snapshot id, then the header. Stages
//! run in reverse plan order so junction copies go before the entities they
//! reference. Live rows never match the delete predicate.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use crate::scope::TenantScope;
use crate::snapshot::header::{delete_header, get_snapshot};
use crate::snapshot::rows::scoped_rows;
use crate::sql::SqlFragment;
use crate::unit_of_work::UnitOfWork;
use probity_core::errors::{ExError, ExErrorKind};
use probity_core::model::{Collection, SnapshotSelector};
use probity_core::plan::SnapshotPlan;
use rusqlite::params_from_iter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionReport {
    pub snapshot_id: String,
    pub stages: Vec<(Collection, usize)>,
}

impl DeletionReport {
    pub fn rows_deleted(&self) -> usize {
        self.stages.iter().map(|(_, n)| n).sum()
    }
}

pub fn delete_snapshot(
    uow: &UnitOfWork<'_>,
    scope: &dyn TenantScope,
    organization_id: &str,
    snapshot_id: &str,
) -> Result<DeletionReport> {
    let header = get_snapshot(uow, scope, organization_id, snapshot_id)?.ok_or_else(|| {
        ExError::new(ExErrorKind::NotFound)
            .with_op("delete_snapshot")
            .with_organization_id(organization_id)
            .with_snapshot_id(snapshot_id)
            .with_message("snapshot not found")
    })?;

    let plan = SnapshotPlan::for_kind(header.kind)?;
    let mut stages = Vec::new();

    for collection in plan.deletion_order() {
        uow.ensure_active(collection.table())?;

        let table = collection.table();
        let mut q = SqlFragment::new(format!("DELETE FROM {table} WHERE "));
        q.append(scoped_rows(
            scope,
            table,
            organization_id,
            &SnapshotSelector::exactly(snapshot_id),
        ));
        let deleted = uow
            .execute(q.sql(), params_from_iter(q.params()))
            .map_err(|e| {
                from_rusqlite(e)
                    .with_op("delete_snapshot")
                    .with_stage(table)
                    .with_snapshot_id(snapshot_id)
            })?;
        tracing::debug!(stage = table, rows_deleted = deleted, "snapshot stage deleted");
        stages.push((collection, deleted));
    }

    delete_header(uow, scope, snapshot_id)?;

    Ok(DeletionReport {
        snapshot_id: snapshot_id.to_string(),
        stages,
    })
}

//! Junction snapshotter
//!
//! Copies live association rows, rewriting both keys onto the copies made
//! earlier in the same snapshot. It must run after the entity snapshotters
//! of both endpoints; the plan guarantees that ordering.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, snapshot_write_error, Result};
use crate::scope::TenantScope;
use crate::snapshot::coordinator::{apply_orphan_policy, stage_error, Snapshotter, StageReport};
use crate::snapshot::rows::{copies_of, scoped_rows};
use crate::snapshot::tables::{junction_table, JunctionTable};
use crate::sql::SqlFragment;
use crate::unit_of_work::UnitOfWork;
use probity_core::errors::{ExError, ExErrorKind};
use probity_core::model::{Collection, SnapshotSelector};
use probity_core::policy::OrphanPolicy;
use rusqlite::params_from_iter;

#[derive(Debug, Clone)]
pub struct JunctionSnapshotter {
    table: &'static JunctionTable,
    orphans: OrphanPolicy,
}

impl JunctionSnapshotter {
    pub fn new(collection: Collection) -> Result<Self> {
        let table = junction_table(collection).ok_or_else(|| {
            ExError::new(ExErrorKind::InvalidInput)
                .with_op("junction_snapshotter")
                .with_message(format!("{collection} is not a junction collection"))
        })?;
        Ok(Self {
            table,
            orphans: OrphanPolicy::default(),
        })
    }

    pub fn with_orphan_policy(mut self, orphans: OrphanPolicy) -> Self {
        self.orphans = orphans;
        self
    }

    /// `live_parents`, `copied_parents`, `copied_children`, `live_junctions`
    fn ctes(
        &self,
        scope: &dyn TenantScope,
        organization_id: &str,
        snapshot_id: &str,
    ) -> SqlFragment {
        let left = &self.table.left;
        let right = &self.table.right;

        let mut q = SqlFragment::new(format!(
            "WITH live_parents AS (SELECT lp.id FROM {} AS lp WHERE ",
            left.collection.table()
        ));
        q.append(scoped_rows(
            scope,
            "lp",
            organization_id,
            &SnapshotSelector::LiveOnly,
        ));
        q.push("), copied_parents AS (");
        q.append(copies_of(left.collection, scope, organization_id, snapshot_id));
        q.push("), copied_children AS (");
        q.append(copies_of(right.collection, scope, organization_id, snapshot_id));
        q.push(&format!(
            "), live_junctions AS (SELECT j.{l} AS left_id, j.{r} AS right_id, j.created_at \
             FROM {table} AS j WHERE ",
            l = left.column,
            r = right.column,
            table = self.table.collection.table()
        ));
        q.append(SqlFragment::and_all([
            scoped_rows(scope, "j", organization_id, &SnapshotSelector::LiveOnly),
            SqlFragment::new(format!("j.{} IN (SELECT id FROM live_parents)", left.column)),
        ]));
        q.push(") ");
        q
    }

    fn copy_statement(
        &self,
        scope: &dyn TenantScope,
        organization_id: &str,
        snapshot_id: &str,
    ) -> SqlFragment {
        let mut q = self.ctes(scope, organization_id, snapshot_id);
        q.push(&format!(
            "INSERT INTO {} ({}, {}, tenant_id, organization_id, snapshot_id, created_at) ",
            self.table.collection.table(),
            self.table.left.column,
            self.table.right.column
        ));
        q.push_bound("SELECT cp.id, cc.id, ?, ", scope.tenant_id().to_string());
        q.push_bound("?, ", organization_id.to_string());
        q.push_bound("?, lj.created_at FROM live_junctions AS lj", snapshot_id.to_string());
        q.push(
            " INNER JOIN copied_parents AS cp ON cp.source_id = lj.left_id \
             INNER JOIN copied_children AS cc ON cc.source_id = lj.right_id",
        );
        q
    }

    /// Live links with at least one endpoint missing from the snapshot
    fn orphan_count_statement(
        &self,
        scope: &dyn TenantScope,
        organization_id: &str,
        snapshot_id: &str,
    ) -> SqlFragment {
        let mut q = self.ctes(scope, organization_id, snapshot_id);
        q.push(
            "SELECT COUNT(*) FROM live_junctions AS lj \
             LEFT JOIN copied_parents AS cp ON cp.source_id = lj.left_id \
             LEFT JOIN copied_children AS cc ON cc.source_id = lj.right_id \
             WHERE cp.id IS NULL OR cc.id IS NULL",
        );
        q
    }

    fn run(
        &self,
        uow: &UnitOfWork<'_>,
        scope: &dyn TenantScope,
        organization_id: &str,
        snapshot_id: &str,
    ) -> Result<StageReport> {
        let q = self.orphan_count_statement(scope, organization_id, snapshot_id);
        let orphans: i64 = uow
            .query_row(q.sql(), params_from_iter(q.params()), |row| row.get(0))
            .map_err(from_rusqlite)?;
        let rows_dropped = orphans as usize;
        apply_orphan_policy(self.orphans, self.collection(), rows_dropped)?;

        let q = self.copy_statement(scope, organization_id, snapshot_id);
        let rows_inserted = uow
            .execute(q.sql(), params_from_iter(q.params()))
            .map_err(|e| snapshot_write_error("insert_snapshots", e))?;

        Ok(StageReport {
            stage: self.collection(),
            rows_inserted,
            rows_dropped,
        })
    }
}

impl Snapshotter for JunctionSnapshotter {
    fn collection(&self) -> Collection {
        self.table.collection
    }

    fn insert_snapshots(
        &self,
        uow: &UnitOfWork<'_>,
        scope: &dyn TenantScope,
        organization_id: &str,
        snapshot_id: &str,
    ) -> Result<StageReport> {
        self.run(uow, scope, organization_id, snapshot_id)
            .map_err(|e| stage_error(self.collection(), organization_id, snapshot_id, e))
    }
}

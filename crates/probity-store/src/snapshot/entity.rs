//! Entity snapshotter
//!
//! Copies every live row of one collection into the target snapshot with a
//! single `INSERT ... SELECT`. Vendor sub-aggregates remap `vendor_id` onto
//! the vendor copies in the same statement.

#![allow(clippy::result_large_err)]

use crate::db::GID_FUNCTION;
use crate::errors::{from_rusqlite, snapshot_write_error, Result};
use crate::scope::TenantScope;
use crate::snapshot::coordinator::{apply_orphan_policy, stage_error, Snapshotter, StageReport};
use crate::snapshot::rows::{copies_of, scoped_rows};
use crate::snapshot::tables::{entity_table, EntityTable, ParentRef};
use crate::sql::SqlFragment;
use crate::unit_of_work::UnitOfWork;
use probity_core::errors::{ExError, ExErrorKind};
use probity_core::model::{Collection, EntityType, SnapshotSelector};
use probity_core::policy::OrphanPolicy;
use rusqlite::params_from_iter;

#[derive(Debug, Clone)]
pub struct EntitySnapshotter {
    table: &'static EntityTable,
    entity_type: EntityType,
    orphans: OrphanPolicy,
}

impl EntitySnapshotter {
    pub fn new(collection: Collection) -> Result<Self> {
        let not_entity = || {
            ExError::new(ExErrorKind::InvalidInput)
                .with_op("entity_snapshotter")
                .with_message(format!("{collection} is not an entity collection"))
        };
        let table = entity_table(collection).ok_or_else(not_entity)?;
        let entity_type = collection.entity_type().ok_or_else(not_entity)?;
        Ok(Self {
            table,
            entity_type,
            orphans: OrphanPolicy::default(),
        })
    }

    pub fn with_orphan_policy(mut self, orphans: OrphanPolicy) -> Self {
        self.orphans = orphans;
        self
    }

    fn table_name(&self) -> &'static str {
        self.table.collection.table()
    }

    fn copied_parents_cte(
        parent: &ParentRef,
        scope: &dyn TenantScope,
        organization_id: &str,
        snapshot_id: &str,
    ) -> SqlFragment {
        let mut q = SqlFragment::new("WITH copied_parents AS (");
        q.append(copies_of(parent.collection, scope, organization_id, snapshot_id));
        q.push(") ");
        q
    }

    fn copy_statement(
        &self,
        scope: &dyn TenantScope,
        organization_id: &str,
        snapshot_id: &str,
    ) -> SqlFragment {
        let tenant = scope.tenant_id().to_string();
        let table = self.table_name();
        let parent = self.table.parent.as_ref();

        let mut target_cols = vec!["id", "tenant_id", "organization_id", "snapshot_id", "source_id"];
        target_cols.extend(parent.map(|p| p.column));
        target_cols.extend(self.table.columns.iter().copied());
        target_cols.extend(["created_at", "updated_at"]);

        let mut q = match parent {
            Some(p) => Self::copied_parents_cte(p, scope, organization_id, snapshot_id),
            None => SqlFragment::default(),
        };
        q.push(&format!("INSERT INTO {table} ({}) ", target_cols.join(", ")));
        q.push_bound(&format!("SELECT {GID_FUNCTION}(?, "), tenant.clone());
        q.push_bound("?), ", i64::from(self.entity_type.tag()));
        q.push_bound("?, src.organization_id, ", tenant);
        q.push_bound("?, src.id", snapshot_id.to_string());
        if parent.is_some() {
            q.push(", cp.id");
        }
        for col in self.table.columns {
            q.push(&format!(", src.{col}"));
        }
        q.push(", src.created_at, src.updated_at");
        q.push(&format!(" FROM {table} AS src"));
        if let Some(p) = parent {
            q.push(&format!(
                " INNER JOIN copied_parents AS cp ON cp.source_id = src.{}",
                p.column
            ));
        }
        q.push(" WHERE ");
        q.append(scoped_rows(
            scope,
            "src",
            organization_id,
            &SnapshotSelector::LiveOnly,
        ));
        q
    }

    /// Live rows whose parent has no copy under the target snapshot
    fn orphan_count_statement(
        &self,
        parent: &ParentRef,
        scope: &dyn TenantScope,
        organization_id: &str,
        snapshot_id: &str,
    ) -> SqlFragment {
        let mut q = Self::copied_parents_cte(parent, scope, organization_id, snapshot_id);
        q.push(&format!(
            "SELECT COUNT(*) FROM {table} AS src \
             LEFT JOIN copied_parents AS cp ON cp.source_id = src.{column} WHERE ",
            table = self.table_name(),
            column = parent.column
        ));
        q.append(SqlFragment::and_all([
            scoped_rows(scope, "src", organization_id, &SnapshotSelector::LiveOnly),
            SqlFragment::new("cp.id IS NULL"),
        ]));
        q
    }

    fn run(
        &self,
        uow: &UnitOfWork<'_>,
        scope: &dyn TenantScope,
        organization_id: &str,
        snapshot_id: &str,
    ) -> Result<StageReport> {
        let mut rows_dropped = 0;
        if let Some(parent) = &self.table.parent {
            let q = self.orphan_count_statement(parent, scope, organization_id, snapshot_id);
            let orphans: i64 = uow
                .query_row(q.sql(), params_from_iter(q.params()), |row| row.get(0))
                .map_err(from_rusqlite)?;
            rows_dropped = orphans as usize;
            apply_orphan_policy(self.orphans, self.collection(), rows_dropped)?;
        }

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

impl Snapshotter for EntitySnapshotter {
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

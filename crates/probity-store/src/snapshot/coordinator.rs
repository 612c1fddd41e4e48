//! Snapshot coordinator
//!
//! A coordinator runs the snapshotters of one aggregate, in plan order,
//! against a single unit of work. It stops at the first failing stage.

#![allow(clippy::result_large_err)]

use crate::errors::Result;
use crate::scope::TenantScope;
use crate::snapshot::entity::EntitySnapshotter;
use crate::snapshot::junction::JunctionSnapshotter;
use crate::unit_of_work::UnitOfWork;
use probity_core::errors::{ExError, ExErrorKind};
use probity_core::model::{Collection, SnapshotKind};
use probity_core::plan::{validate_order, SnapshotPlan};
use probity_core::policy::OrphanPolicy;

/// One step of a snapshot: copies a single collection
pub trait Snapshotter {
    fn collection(&self) -> Collection;

    /// Stage name used in logs, reports and errors
    fn name(&self) -> &'static str {
        self.collection().table()
    }

    fn insert_snapshots(
        &self,
        uow: &UnitOfWork<'_>,
        scope: &dyn TenantScope,
        organization_id: &str,
        snapshot_id: &str,
    ) -> Result<StageReport>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageReport {
    pub stage: Collection,
    pub rows_inserted: usize,
    pub rows_dropped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotReport {
    pub kind: SnapshotKind,
    pub snapshot_id: String,
    pub stages: Vec<StageReport>,
}

impl SnapshotReport {
    pub fn rows_inserted(&self) -> usize {
        self.stages.iter().map(|s| s.rows_inserted).sum()
    }

    pub fn rows_dropped(&self) -> usize {
        self.stages.iter().map(|s| s.rows_dropped).sum()
    }

    pub fn stage(&self, collection: Collection) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.stage == collection)
    }
}

/// Build the snapshotter that copies `collection`
pub fn snapshotter_for(collection: Collection, orphans: OrphanPolicy) -> Result<Box<dyn Snapshotter>> {
    if collection.is_junction() {
        Ok(Box::new(
            JunctionSnapshotter::new(collection)?.with_orphan_policy(orphans),
        ))
    } else {
        Ok(Box::new(
            EntitySnapshotter::new(collection)?.with_orphan_policy(orphans),
        ))
    }
}

pub struct Coordinator {
    kind: SnapshotKind,
    stages: Vec<Box<dyn Snapshotter>>,
}

impl Coordinator {
    /// Coordinator over the curated stage list of `kind`
    pub fn for_kind(kind: SnapshotKind, orphans: OrphanPolicy) -> Result<Self> {
        let plan = SnapshotPlan::for_kind(kind)?;
        Self::from_plan(&plan, orphans)
    }

    pub fn from_plan(plan: &SnapshotPlan, orphans: OrphanPolicy) -> Result<Self> {
        let stages = plan
            .stages()
            .iter()
            .map(|&c| snapshotter_for(c, orphans))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            kind: plan.kind(),
            stages,
        })
    }

    /// Coordinator over caller-supplied snapshotters, checked against the
    /// dependency graph
    pub fn with_snapshotters(kind: SnapshotKind, stages: Vec<Box<dyn Snapshotter>>) -> Result<Self> {
        let collections: Vec<Collection> = stages.iter().map(|s| s.collection()).collect();
        validate_order(&collections)?;
        Ok(Self { kind, stages })
    }

    pub fn kind(&self) -> SnapshotKind {
        self.kind
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn snapshot(
        &self,
        uow: &UnitOfWork<'_>,
        scope: &dyn TenantScope,
        organization_id: &str,
        snapshot_id: &str,
    ) -> Result<SnapshotReport> {
        let mut reports = Vec::with_capacity(self.stages.len());

        for snapshotter in &self.stages {
            uow.ensure_active(snapshotter.name()).map_err(|e| {
                e.with_organization_id(organization_id)
                    .with_snapshot_id(snapshot_id)
            })?;

            let report = snapshotter.insert_snapshots(uow, scope, organization_id, snapshot_id)?;
            tracing::debug!(
                stage = snapshotter.name(),
                rows_inserted = report.rows_inserted,
                rows_dropped = report.rows_dropped,
                "stage complete"
            );
            reports.push(report);
        }

        Ok(SnapshotReport {
            kind: self.kind,
            snapshot_id: snapshot_id.to_string(),
            stages: reports,
        })
    }
}

/// Wrap a stage failure, keeping the inner kind
pub(crate) fn stage_error(
    collection: Collection,
    organization_id: &str,
    snapshot_id: &str,
    inner: ExError,
) -> ExError {
    ExError::new(inner.kind())
        .with_op("insert_snapshots")
        .with_stage(collection.table())
        .with_organization_id(organization_id)
        .with_snapshot_id(snapshot_id)
        .with_message(format!("stage {} failed", collection.table()))
        .with_source(inner)
}

pub(crate) fn apply_orphan_policy(
    policy: OrphanPolicy,
    collection: Collection,
    orphans: usize,
) -> Result<()> {
    if orphans == 0 {
        return Ok(());
    }
    match policy {
        OrphanPolicy::Fail => Err(ExError::new(ExErrorKind::OrphanedRows).with_message(format!(
            "{orphans} live rows reference endpoints with no copy in this snapshot"
        ))),
        OrphanPolicy::Prune => {
            tracing::warn!(
                stage = collection.table(),
                rows_dropped = orphans,
                "dropping rows whose endpoints have no copy"
            );
            Ok(())
        }
    }
}

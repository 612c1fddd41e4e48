//! Snapshot orchestration
//!
//! `take_snapshot`:
//! 1. Build the aggregate's coordinator (plan validated before any write)
//! 2. Open a unit of work with the configured transaction mode
//! 3. Insert the header with the snapshot id
//! 4. Run every stage of the coordinator
//! 5. Commit
//!
//! Any failure drops the unit of work, which rolls back the header and all
//! copies made so far.

#![allow(clippy::result_large_err)]

use crate::config::{EngineConfig, TransactionMode};
use probity_core::errors::ExError;
use probity_core::model::{EntityType, GidGenerator, Snapshot, SnapshotKind};
use probity_core::policy::OrphanPolicy;
use probity_core::{log_op_end, log_op_error, log_op_start};
use probity_core_types::RequestContext;
use probity_store::errors::Result;
use probity_store::snapshot::{
    delete_snapshot as delete_snapshot_rows, insert_snapshot_header, Coordinator, DeletionReport,
    SnapshotReport,
};
use probity_store::{CancellationToken, TenantScope, UnitOfWork};
use rusqlite::Connection;
use std::time::Instant;

/// Options shared by snapshot commands
#[derive(Debug, Clone, Default)]
pub struct SnapshotOptions {
    pub transaction: TransactionMode,
    pub orphans: OrphanPolicy,
    pub cancel: CancellationToken,
}

impl SnapshotOptions {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            transaction: config.transaction,
            orphans: config.orphans,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_orphans(mut self, orphans: OrphanPolicy) -> Self {
        self.orphans = orphans;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

#[derive(Debug, Clone)]
pub struct TakeSnapshotRequest {
    pub organization_id: String,
    /// Generated when absent
    pub snapshot_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub kind: SnapshotKind,
}

#[derive(Debug, Clone)]
pub struct TakeSnapshotResult {
    pub snapshot: Snapshot,
    pub report: SnapshotReport,
}

fn with_context(err: ExError, ctx: &RequestContext) -> ExError {
    let err = err.with_request_id(ctx.request_id.clone());
    match &ctx.trace_id {
        Some(trace_id) => err.with_trace_id(trace_id.clone()),
        None => err,
    }
}

/// Capture a snapshot of one aggregate in a single transaction
pub fn take_snapshot(
    conn: &mut Connection,
    scope: &dyn TenantScope,
    request: TakeSnapshotRequest,
    options: &SnapshotOptions,
    ctx: &RequestContext,
) -> Result<TakeSnapshotResult> {
    log_op_start!(
        "take_snapshot",
        request_id = ctx.request_id.as_str(),
        organization_id = request.organization_id.as_str(),
        snapshot_kind = request.kind.as_str()
    );
    let start = Instant::now();

    let result = take_snapshot_impl(conn, scope, request, options).map_err(|e| {
        let e = with_context(e, ctx);
        log_op_error!(
            "take_snapshot",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = ctx.request_id.as_str()
        );
        e
    })?;

    log_op_end!(
        "take_snapshot",
        duration_ms = start.elapsed().as_millis() as u64,
        request_id = ctx.request_id.as_str(),
        snapshot_id = result.snapshot.id.as_str(),
        rows_inserted = result.report.rows_inserted(),
        rows_dropped = result.report.rows_dropped()
    );

    Ok(result)
}

fn take_snapshot_impl(
    conn: &mut Connection,
    scope: &dyn TenantScope,
    request: TakeSnapshotRequest,
    options: &SnapshotOptions,
) -> Result<TakeSnapshotResult> {
    let coordinator = Coordinator::for_kind(request.kind, options.orphans)?;

    let snapshot_id = request.snapshot_id.unwrap_or_else(|| {
        GidGenerator::new()
            .generate(scope.tenant_id(), EntityType::Snapshot)
            .to_string()
    });
    let mut snapshot = Snapshot::new(
        snapshot_id,
        request.organization_id,
        scope.tenant_id(),
        request.name,
        request.kind,
    );
    snapshot.description = request.description;

    let uow = UnitOfWork::begin(conn, options.transaction.behavior())?
        .with_cancellation(options.cancel.clone());

    insert_snapshot_header(&uow, scope, &snapshot)?;
    let report = coordinator.snapshot(&uow, scope, &snapshot.organization_id, &snapshot.id)?;
    uow.commit()?;

    Ok(TakeSnapshotResult { snapshot, report })
}

/// Remove a snapshot's copies and header in a single transaction
pub fn delete_snapshot(
    conn: &mut Connection,
    scope: &dyn TenantScope,
    organization_id: &str,
    snapshot_id: &str,
    options: &SnapshotOptions,
    ctx: &RequestContext,
) -> Result<DeletionReport> {
    log_op_start!(
        "delete_snapshot",
        request_id = ctx.request_id.as_str(),
        organization_id = organization_id,
        snapshot_id = snapshot_id
    );
    let start = Instant::now();

    let result = delete_snapshot_impl(conn, scope, organization_id, snapshot_id, options)
        .map_err(|e| {
            let e = with_context(e, ctx);
            log_op_error!(
                "delete_snapshot",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                request_id = ctx.request_id.as_str()
            );
            e
        })?;

    log_op_end!(
        "delete_snapshot",
        duration_ms = start.elapsed().as_millis() as u64,
        request_id = ctx.request_id.as_str(),
        snapshot_id = snapshot_id,
        rows_deleted = result.rows_deleted()
    );

    Ok(result)
}

fn delete_snapshot_impl(
    conn: &mut Connection,
    scope: &dyn TenantScope,
    organization_id: &str,
    snapshot_id: &str,
    options: &SnapshotOptions,
) -> Result<DeletionReport> {
    let uow = UnitOfWork::begin(conn, options.transaction.behavior())?
        .with_cancellation(options.cancel.clone());
    let report = delete_snapshot_rows(&uow, scope, organization_id, snapshot_id)?;
    uow.commit()?;
    Ok(report)
}

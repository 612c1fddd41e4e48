//! Engine-level commands that write to the database.

#![allow(clippy::result_large_err)]

use crate::commands::snapshot::{
    delete_snapshot, take_snapshot, SnapshotOptions, TakeSnapshotRequest, TakeSnapshotResult,
};
use probity_core_types::RequestContext;
use probity_store::errors::Result;
use probity_store::snapshot::DeletionReport;
use probity_store::TenantScope;
use rusqlite::Connection;

#[derive(Debug, Clone)]
pub enum EngineCommand {
    TakeSnapshot(TakeSnapshotRequest),
    DeleteSnapshot {
        organization_id: String,
        snapshot_id: String,
    },
}

#[derive(Debug, Clone)]
pub enum EngineCommandResult {
    SnapshotTaken(TakeSnapshotResult),
    SnapshotDeleted(DeletionReport),
}

/// Apply an engine command inside its own transaction
pub fn apply_engine_command(
    cmd: EngineCommand,
    conn: &mut Connection,
    scope: &dyn TenantScope,
    options: &SnapshotOptions,
    ctx: &RequestContext,
) -> Result<EngineCommandResult> {
    match cmd {
        EngineCommand::TakeSnapshot(request) => {
            take_snapshot(conn, scope, request, options, ctx).map(EngineCommandResult::SnapshotTaken)
        }
        EngineCommand::DeleteSnapshot {
            organization_id,
            snapshot_id,
        } => delete_snapshot(conn, scope, &organization_id, &snapshot_id, options, ctx)
            .map(EngineCommandResult::SnapshotDeleted),
    }
}

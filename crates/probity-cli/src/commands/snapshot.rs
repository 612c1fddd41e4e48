//! Snapshot commands

use crate::commands::StoreArgs;
use clap::{Args, Subcommand};
use probity_core::model::{SnapshotKind, TenantId};
use probity_core::plan::SnapshotPlan;
use probity_core::policy::OrphanPolicy;
use probity_core_types::RequestContext;
use probity_engine::commands::engine_command::{
    apply_engine_command, EngineCommand, EngineCommandResult,
};
use probity_engine::commands::snapshot::{SnapshotOptions, TakeSnapshotRequest};
use probity_store::snapshot::list_snapshots;
use probity_store::Scope;

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    #[command(subcommand)]
    pub command: SnapshotCommand,
}

#[derive(Debug, Subcommand)]
pub enum SnapshotCommand {
    /// Capture a snapshot of one aggregate
    Take(TakeArgs),
    /// Delete a snapshot and all of its copies
    Delete(DeleteArgs),
    /// List the snapshots of an organization
    List(ListArgs),
    /// Print the ordered stages of an aggregate
    Plan(PlanArgs),
}

#[derive(Debug, Args)]
pub struct TakeArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Tenant id, 16 hex characters
    #[arg(long)]
    pub tenant: TenantId,

    #[arg(long)]
    pub org: String,

    /// Aggregate to capture, e.g. `assets` or `PROCESSING_ACTIVITIES`
    #[arg(long)]
    pub kind: SnapshotKind,

    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub description: Option<String>,

    /// Snapshot id; generated when omitted
    #[arg(long)]
    pub id: Option<String>,

    /// Overrides `orphans` from the config
    #[arg(long)]
    pub orphans: Option<OrphanPolicy>,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[arg(long)]
    pub tenant: TenantId,

    #[arg(long)]
    pub org: String,

    #[arg(long)]
    pub id: String,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[arg(long)]
    pub tenant: TenantId,

    #[arg(long)]
    pub org: String,
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    #[arg(long)]
    pub kind: SnapshotKind,
}

pub fn execute(args: SnapshotArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        SnapshotCommand::Take(a) => execute_take(a),
        SnapshotCommand::Delete(a) => execute_delete(a),
        SnapshotCommand::List(a) => execute_list(a),
        SnapshotCommand::Plan(a) => execute_plan(a),
    }
}

fn execute_take(args: TakeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (config, mut conn) = args.store.open()?;
    let mut options = SnapshotOptions::from_config(&config);
    if let Some(orphans) = args.orphans {
        options = options.with_orphans(orphans);
    }

    let cmd = EngineCommand::TakeSnapshot(TakeSnapshotRequest {
        organization_id: args.org,
        snapshot_id: args.id,
        name: args.name,
        description: args.description,
        kind: args.kind,
    });

    let scope = Scope::new(args.tenant);
    let EngineCommandResult::SnapshotTaken(taken) =
        apply_engine_command(cmd, &mut conn, &scope, &options, &RequestContext::new())?
    else {
        return Err("unexpected engine result".into());
    };

    println!("Snapshot taken:");
    println!("  snapshot_id: {}", taken.snapshot.id);
    println!("  kind: {}", taken.snapshot.kind);
    for stage in &taken.report.stages {
        println!(
            "  {}: inserted {}, dropped {}",
            stage.stage, stage.rows_inserted, stage.rows_dropped
        );
    }
    Ok(())
}

fn execute_delete(args: DeleteArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (config, mut conn) = args.store.open()?;
    let options = SnapshotOptions::from_config(&config);

    let cmd = EngineCommand::DeleteSnapshot {
        organization_id: args.org,
        snapshot_id: args.id,
    };

    let scope = Scope::new(args.tenant);
    let EngineCommandResult::SnapshotDeleted(report) =
        apply_engine_command(cmd, &mut conn, &scope, &options, &RequestContext::new())?
    else {
        return Err("unexpected engine result".into());
    };

    println!("Snapshot deleted:");
    println!("  snapshot_id: {}", report.snapshot_id);
    println!("  rows_deleted: {}", report.rows_deleted());
    Ok(())
}

fn execute_list(args: ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (_, conn) = args.store.open()?;
    let scope = Scope::new(args.tenant);

    for snapshot in list_snapshots(&conn, &scope, &args.org)? {
        println!(
            "{}\t{}\t{}\t{}",
            snapshot.id,
            snapshot.kind,
            snapshot.created_at.to_rfc3339(),
            snapshot.name
        );
    }
    Ok(())
}

fn execute_plan(args: PlanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let plan = SnapshotPlan::for_kind(args.kind)?;
    for stage in plan.stages() {
        println!("{}", stage);
    }
    Ok(())
}

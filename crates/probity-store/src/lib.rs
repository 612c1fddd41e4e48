//! Probity Store - SQLite persistence for the snapshot engine
//!
//! Provides:
//! - Connection setup, including the `probity_gid` SQL function
//! - Embedded migrations with checksums
//! - Tenant scope, SQL fragments and the snapshot-identity filter
//! - The unit of work every snapshot runs inside
//! - Entity and junction snapshotters, per-aggregate coordinators,
//!   snapshot headers, listing and deletion
//! - Guarded mutation of live rows

pub mod db;
pub mod errors;
pub mod filter;
pub mod migrations;
pub mod repo;
pub mod scope;
pub mod snapshot;
pub mod sql;
pub mod unit_of_work;

// Re-export key types
pub use errors::Result;
pub use scope::{Scope, TenantScope};
pub use sql::SqlFragment;
pub use unit_of_work::{CancellationToken, UnitOfWork};

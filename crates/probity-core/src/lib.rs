//! Probity Core - domain kernel of the compliance snapshot engine
//!
//! This crate holds everything about snapshots that does not touch the
//! database:
//! - the structured error facility (`ExError`) and domain errors
//! - the logging facility and its canonical macros
//! - typed identifiers (`TenantId`, `Gid`) and their generator
//! - snapshot-aware collections, aggregate kinds and the dependency graph
//! - tri-state selectors used to build snapshot-identity filters

pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod plan;
pub mod policy;

pub use errors::{ExError, ExErrorKind, ProbityError, Result};
pub use model::{
    Collection, EntityType, Gid, GidGenerator, NullableFilter, Snapshot, SnapshotKind,
    SnapshotSelector, TenantId,
};
pub use plan::SnapshotPlan;
pub use policy::OrphanPolicy;

//! Snapshot persistence
//!
//! - `coordinator`: per-aggregate stage runner
//! - `entity` / `junction`: the two kinds of snapshotter
//! - `header`: snapshot header rows
//! - `query`: listing helpers over live rows and copies
//! - `delete`: removal of a whole snapshot

pub mod coordinator;
pub mod delete;
pub mod entity;
pub mod header;
pub mod junction;
pub mod query;
pub(crate) mod rows;
pub mod tables;

pub use coordinator::{snapshotter_for, Coordinator, SnapshotReport, Snapshotter, StageReport};
pub use delete::{delete_snapshot, DeletionReport};
pub use entity::EntitySnapshotter;
pub use header::{ensure_organization, get_snapshot, insert_snapshot_header, list_snapshots};
pub use junction::JunctionSnapshotter;
pub use query::{count_rows, list_entity_ids, list_links, RowFilter};

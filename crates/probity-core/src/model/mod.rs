pub mod collection;
pub mod ids;
pub mod selector;
pub mod snapshot;

pub use collection::{Collection, SnapshotKind};
pub use ids::{EntityType, Gid, GidGenerator, TenantId};
pub use selector::{NullableFilter, SnapshotSelector};
pub use snapshot::Snapshot;

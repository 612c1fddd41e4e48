//! Snapshot-identity filter
//!
//! Turns the tri-state selectors of probity-core into SQL predicates that
//! compose with the tenant scope through [`SqlFragment::and_all`].

use crate::sql::SqlFragment;
use probity_core::model::{NullableFilter, SnapshotSelector};

/// Predicate over `{alias}.snapshot_id`
pub fn snapshot_predicate(selector: &SnapshotSelector, alias: &str) -> SqlFragment {
    match selector {
        SnapshotSelector::Unconstrained => SqlFragment::always(),
        SnapshotSelector::LiveOnly => SqlFragment::new(format!("{alias}.snapshot_id IS NULL")),
        SnapshotSelector::Exactly(id) => {
            SqlFragment::new(format!("{alias}.snapshot_id = ?")).bind(id.clone())
        }
    }
}

/// Predicate over any nullable text column
pub fn nullable_predicate(filter: &NullableFilter<String>, column: &str) -> SqlFragment {
    match filter {
        NullableFilter::Any => SqlFragment::always(),
        NullableFilter::Null => SqlFragment::new(format!("{column} IS NULL")),
        NullableFilter::Equals(v) => SqlFragment::new(format!("{column} = ?")).bind(v.clone()),
    }
}

//! Row-set fragments shared by the snapshotters

use crate::filter::snapshot_predicate;
use crate::scope::TenantScope;
use crate::sql::SqlFragment;
use probity_core::model::{Collection, SnapshotSelector};

pub(crate) fn organization_predicate(alias: &str, organization_id: &str) -> SqlFragment {
    SqlFragment::new(format!("{alias}.organization_id = ?")).bind(organization_id.to_string())
}

/// Rows of one organization under one snapshot selector, tenant-scoped
pub(crate) fn scoped_rows(
    scope: &dyn TenantScope,
    alias: &str,
    organization_id: &str,
    selector: &SnapshotSelector,
) -> SqlFragment {
    SqlFragment::and_all([
        organization_predicate(alias, organization_id),
        snapshot_predicate(selector, alias),
        scope.predicate(alias),
    ])
}

/// `SELECT id, source_id` of the copies of `collection` under `snapshot_id`
pub(crate) fn copies_of(
    collection: Collection,
    scope: &dyn TenantScope,
    organization_id: &str,
    snapshot_id: &str,
) -> SqlFragment {
    let mut q = SqlFragment::new(format!(
        "SELECT c.id, c.source_id FROM {} AS c WHERE ",
        collection.table()
    ));
    q.append(scoped_rows(
        scope,
        "c",
        organization_id,
        &SnapshotSelector::exactly(snapshot_id),
    ));
    q
}

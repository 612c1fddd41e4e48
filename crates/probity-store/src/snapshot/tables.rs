//! Column catalogue of the snapshot-aware tables
//!
//! Only business columns are listed; the shared columns (`id`, `tenant_id`,
//! `organization_id`, `snapshot_id`, `source_id`, `created_at`,
//! `updated_at`) are handled by the snapshotters themselves.

use probity_core::model::Collection;

/// A foreign key that must be remapped onto copies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentRef {
    pub column: &'static str,
    pub collection: Collection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityTable {
    pub collection: Collection,
    pub columns: &'static [&'static str],
    pub parent: Option<ParentRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JunctionTable {
    pub collection: Collection,
    pub left: ParentRef,
    pub right: ParentRef,
}

const VENDOR_PARENT: Option<ParentRef> = Some(ParentRef {
    column: "vendor_id",
    collection: Collection::Vendors,
});

const fn root(collection: Collection, columns: &'static [&'static str]) -> EntityTable {
    EntityTable {
        collection,
        columns,
        parent: None,
    }
}

const fn vendor_child(collection: Collection, columns: &'static [&'static str]) -> EntityTable {
    EntityTable {
        collection,
        columns,
        parent: VENDOR_PARENT,
    }
}

static ENTITY_TABLES: [EntityTable; 15] = [
    root(
        Collection::Vendors,
        &[
            "name",
            "description",
            "category",
            "website_url",
            "legal_name",
            "headquarter_address",
            "privacy_policy_url",
            "business_owner_id",
            "security_owner_id",
            "show_on_trust_center",
        ],
    ),
    vendor_child(
        Collection::VendorContacts,
        &["full_name", "email", "phone", "role"],
    ),
    vendor_child(Collection::VendorServices, &["name", "description"]),
    vendor_child(
        Collection::VendorComplianceReports,
        &["report_name", "report_date", "valid_until", "file_id"],
    ),
    vendor_child(
        Collection::VendorBusinessAssociateAgreements,
        &["file_id", "valid_from", "valid_until"],
    ),
    vendor_child(
        Collection::VendorDataPrivacyAgreements,
        &["file_id", "valid_from", "valid_until"],
    ),
    vendor_child(
        Collection::VendorRiskAssessments,
        &[
            "assessed_by_id",
            "expires_at",
            "data_sensitivity",
            "business_impact",
            "notes",
        ],
    ),
    root(
        Collection::Risks,
        &[
            "name",
            "description",
            "category",
            "treatment",
            "owner_id",
            "inherent_likelihood",
            "inherent_impact",
            "residual_likelihood",
            "residual_impact",
            "note",
        ],
    ),
    root(
        Collection::Assets,
        &["name", "amount", "owner_id", "asset_type", "data_types_stored"],
    ),
    root(Collection::Data, &["name", "data_classification", "owner_id"]),
    root(
        Collection::Obligations,
        &[
            "area",
            "source",
            "requirement",
            "actions_to_be_implemented",
            "regulator",
            "owner_id",
            "last_review_date",
            "due_date",
            "status",
        ],
    ),
    root(
        Collection::ContinualImprovements,
        &[
            "reference_id",
            "description",
            "source",
            "owner_id",
            "target_date",
            "status",
            "priority",
        ],
    ),
    root(
        Collection::Nonconformities,
        &[
            "reference_id",
            "description",
            "audit_id",
            "date_identified",
            "root_cause",
            "corrective_action",
            "owner_id",
            "due_date",
            "status",
            "effectiveness_check",
        ],
    ),
    root(
        Collection::ProcessingActivities,
        &[
            "name",
            "purpose",
            "data_subject_category",
            "personal_data_category",
            "lawful_basis",
            "recipients",
            "location",
            "international_transfers",
            "retention_period",
            "security_measures",
        ],
    ),
    root(
        Collection::StatesOfApplicability,
        &["name", "description", "owner_id"],
    ),
];

static JUNCTION_TABLES: [JunctionTable; 3] = [
    JunctionTable {
        collection: Collection::AssetVendors,
        left: ParentRef {
            column: "asset_id",
            collection: Collection::Assets,
        },
        right: ParentRef {
            column: "vendor_id",
            collection: Collection::Vendors,
        },
    },
    JunctionTable {
        collection: Collection::DataVendors,
        left: ParentRef {
            column: "datum_id",
            collection: Collection::Data,
        },
        right: ParentRef {
            column: "vendor_id",
            collection: Collection::Vendors,
        },
    },
    JunctionTable {
        collection: Collection::ProcessingActivityVendors,
        left: ParentRef {
            column: "processing_activity_id",
            collection: Collection::ProcessingActivities,
        },
        right: ParentRef {
            column: "vendor_id",
            collection: Collection::Vendors,
        },
    },
];

pub fn entity_table(collection: Collection) -> Option<&'static EntityTable> {
    ENTITY_TABLES.iter().find(|t| t.collection == collection)
}

pub fn junction_table(collection: Collection) -> Option<&'static JunctionTable> {
    JUNCTION_TABLES.iter().find(|t| t.collection == collection)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_collection_has_exactly_one_table() {
        for c in Collection::ALL {
            let entity = entity_table(c).is_some();
            let junction = junction_table(c).is_some();
            assert!(entity != junction, "{c}");
            assert_eq!(junction, c.is_junction(), "{c}");
        }
    }

    #[test]
    fn test_remapped_columns_match_dependency_graph() {
        for c in Collection::ALL {
            let mut parents: Vec<Collection> = match (entity_table(c), junction_table(c)) {
                (Some(t), _) => t.parent.iter().map(|p| p.collection).collect(),
                (_, Some(j)) => vec![j.left.collection, j.right.collection],
                _ => unreachable!(),
            };
            let mut required = c.requires().to_vec();
            parents.sort();
            required.sort();
            assert_eq!(parents, required, "{c}");
        }
    }
}

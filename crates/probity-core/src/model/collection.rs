//! Snapshot-aware collections and the aggregates that group them

use crate::errors::ProbityError;
use crate::model::ids::EntityType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A table whose live rows are copied into snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Vendors,
    VendorContacts,
    VendorServices,
    VendorComplianceReports,
    VendorBusinessAssociateAgreements,
    VendorDataPrivacyAgreements,
    VendorRiskAssessments,
    Risks,
    Assets,
    Data,
    Obligations,
    ContinualImprovements,
    Nonconformities,
    ProcessingActivities,
    StatesOfApplicability,
    AssetVendors,
    DataVendors,
    ProcessingActivityVendors,
}

impl Collection {
    pub const ALL: [Collection; 18] = [
        Collection::Vendors,
        Collection::VendorContacts,
        Collection::VendorServices,
        Collection::VendorComplianceReports,
        Collection::VendorBusinessAssociateAgreements,
        Collection::VendorDataPrivacyAgreements,
        Collection::VendorRiskAssessments,
        Collection::Risks,
        Collection::Assets,
        Collection::Data,
        Collection::Obligations,
        Collection::ContinualImprovements,
        Collection::Nonconformities,
        Collection::ProcessingActivities,
        Collection::StatesOfApplicability,
        Collection::AssetVendors,
        Collection::DataVendors,
        Collection::ProcessingActivityVendors,
    ];

    /// SQL table name; also the stage name reported in logs and errors
    pub fn table(self) -> &'static str {
        match self {
            Collection::Vendors => "vendors",
            Collection::VendorContacts => "vendor_contacts",
            Collection::VendorServices => "vendor_services",
            Collection::VendorComplianceReports => "vendor_compliance_reports",
            Collection::VendorBusinessAssociateAgreements => {
                "vendor_business_associate_agreements"
            }
            Collection::VendorDataPrivacyAgreements => "vendor_data_privacy_agreements",
            Collection::VendorRiskAssessments => "vendor_risk_assessments",
            Collection::Risks => "risks",
            Collection::Assets => "assets",
            Collection::Data => "data",
            Collection::Obligations => "obligations",
            Collection::ContinualImprovements => "continual_improvements",
            Collection::Nonconformities => "nonconformities",
            Collection::ProcessingActivities => "processing_activities",
            Collection::StatesOfApplicability => "states_of_applicability",
            Collection::AssetVendors => "asset_vendors",
            Collection::DataVendors => "data_vendors",
            Collection::ProcessingActivityVendors => "processing_activity_vendors",
        }
    }

    /// Tag used for identifiers of copied rows; `None` for junctions, which
    /// have no identity of their own
    pub fn entity_type(self) -> Option<EntityType> {
        let ty = match self {
            Collection::Vendors => EntityType::Vendor,
            Collection::VendorContacts => EntityType::VendorContact,
            Collection::VendorServices => EntityType::VendorService,
            Collection::VendorComplianceReports => EntityType::VendorComplianceReport,
            Collection::VendorBusinessAssociateAgreements => {
                EntityType::VendorBusinessAssociateAgreement
            }
            Collection::VendorDataPrivacyAgreements => EntityType::VendorDataPrivacyAgreement,
            Collection::VendorRiskAssessments => EntityType::VendorRiskAssessment,
            Collection::Risks => EntityType::Risk,
            Collection::Assets => EntityType::Asset,
            Collection::Data => EntityType::Datum,
            Collection::Obligations => EntityType::Obligation,
            Collection::ContinualImprovements => EntityType::ContinualImprovement,
            Collection::Nonconformities => EntityType::Nonconformity,
            Collection::ProcessingActivities => EntityType::ProcessingActivity,
            Collection::StatesOfApplicability => EntityType::StateOfApplicability,
            Collection::AssetVendors
            | Collection::DataVendors
            | Collection::ProcessingActivityVendors => return None,
        };
        Some(ty)
    }

    pub fn is_junction(self) -> bool {
        self.entity_type().is_none()
    }

    /// Collections whose copies must already exist, under the same snapshot
    /// id, before this collection can be copied
    pub fn requires(self) -> &'static [Collection] {
        match self {
            Collection::VendorContacts
            | Collection::VendorServices
            | Collection::VendorComplianceReports
            | Collection::VendorBusinessAssociateAgreements
            | Collection::VendorDataPrivacyAgreements
            | Collection::VendorRiskAssessments => &[Collection::Vendors],
            Collection::AssetVendors => &[Collection::Assets, Collection::Vendors],
            Collection::DataVendors => &[Collection::Data, Collection::Vendors],
            Collection::ProcessingActivityVendors => {
                &[Collection::ProcessingActivities, Collection::Vendors]
            }
            _ => &[],
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

impl FromStr for Collection {
    type Err = ProbityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .iter()
            .copied()
            .find(|c| c.table() == s)
            .ok_or_else(|| ProbityError::UnknownCollection {
                value: s.to_string(),
            })
    }
}

/// Aggregate root a snapshot is taken of; persisted as the header `type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SnapshotKind {
    Risks,
    Vendors,
    Assets,
    Data,
    Obligations,
    ContinualImprovements,
    Nonconformities,
    ProcessingActivities,
    StatesOfApplicability,
}

impl SnapshotKind {
    pub const ALL: [SnapshotKind; 9] = [
        SnapshotKind::Risks,
        SnapshotKind::Vendors,
        SnapshotKind::Assets,
        SnapshotKind::Data,
        SnapshotKind::Obligations,
        SnapshotKind::ContinualImprovements,
        SnapshotKind::Nonconformities,
        SnapshotKind::ProcessingActivities,
        SnapshotKind::StatesOfApplicability,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SnapshotKind::Risks => "RISKS",
            SnapshotKind::Vendors => "VENDORS",
            SnapshotKind::Assets => "ASSETS",
            SnapshotKind::Data => "DATA",
            SnapshotKind::Obligations => "OBLIGATIONS",
            SnapshotKind::ContinualImprovements => "CONTINUAL_IMPROVEMENTS",
            SnapshotKind::Nonconformities => "NONCONFORMITIES",
            SnapshotKind::ProcessingActivities => "PROCESSING_ACTIVITIES",
            SnapshotKind::StatesOfApplicability => "STATES_OF_APPLICABILITY",
        }
    }
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SnapshotKind {
    type Err = ProbityError;

    /// Accepts the persisted form (`PROCESSING_ACTIVITIES`) as well as
    /// lowercase or kebab-case spellings used on the command line
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        SnapshotKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| ProbityError::UnknownSnapshotKind {
                value: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_round_trips_through_table_name() {
        for c in Collection::ALL {
            assert_eq!(c.table().parse::<Collection>().unwrap(), c);
        }
        assert!("people".parse::<Collection>().is_err());
    }

    #[test]
    fn test_junctions_have_no_entity_type() {
        assert!(Collection::AssetVendors.is_junction());
        assert!(Collection::DataVendors.is_junction());
        assert!(!Collection::Vendors.is_junction());
    }

    #[test]
    fn test_every_junction_requires_both_endpoints() {
        for c in Collection::ALL.iter().filter(|c| c.is_junction()) {
            assert_eq!(c.requires().len(), 2, "{c}");
            assert!(c.requires().contains(&Collection::Vendors));
        }
    }

    #[test]
    fn test_snapshot_kind_parsing() {
        assert_eq!(
            "processing-activities".parse::<SnapshotKind>().unwrap(),
            SnapshotKind::ProcessingActivities
        );
        assert_eq!("RISKS".parse::<SnapshotKind>().unwrap(), SnapshotKind::Risks);
        assert!("controls".parse::<SnapshotKind>().is_err());
    }
}

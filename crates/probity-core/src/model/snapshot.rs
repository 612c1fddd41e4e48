//! Snapshot header model

use crate::errors::ProbityError;
use crate::model::collection::SnapshotKind;
use crate::model::ids::TenantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One "take snapshot" action
///
/// The header row is written before any collection is copied; copies refer
/// to it only through the shared `snapshot_id` value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
    pub organization_id: String,
    pub tenant_id: TenantId,
    pub name: String,
    pub description: Option<String>,
    pub kind: SnapshotKind,
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(
        id: impl Into<String>,
        organization_id: impl Into<String>,
        tenant_id: TenantId,
        name: impl Into<String>,
        kind: SnapshotKind,
    ) -> Self {
        Self {
            id: id.into(),
            organization_id: organization_id.into(),
            tenant_id,
            name: name.into(),
            description: None,
            kind,
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self) -> Result<(), ProbityError> {
        if self.name.trim().is_empty() {
            return Err(ProbityError::EmptySnapshotName);
        }
        Ok(())
    }
}

//! Typed identifiers
//!
//! A [`Gid`] packs the owning tenant and the kind of entity it names into the
//! identifier itself, so an id copied into the wrong table or tenant is
//! detectable without a lookup.
//!
//! Layout (24 bytes, rendered base64url without padding, 32 chars):
//!
//! | bytes  | content                      |
//! |--------|------------------------------|
//! | 0..8   | tenant id                    |
//! | 8..10  | entity-type tag (u16, BE)    |
//! | 10..18 | unix milliseconds (u64, BE)  |
//! | 18..24 | sequence (48 bits, BE)       |

use crate::errors::ProbityError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

const SEQUENCE_MASK: u64 = (1 << 48) - 1;

/// Tenant identifier, eight opaque bytes rendered as 16 lowercase hex chars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantId([u8; 8]);

impl TenantId {
    pub const fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for TenantId {
    type Err = ProbityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ProbityError::InvalidTenantId {
            value: s.to_string(),
        };
        let bytes = hex::decode(s).map_err(|_| invalid())?;
        let bytes: [u8; 8] = bytes.try_into().map_err(|_| invalid())?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for TenantId {
    type Error = ProbityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TenantId> for String {
    fn from(id: TenantId) -> Self {
        id.to_string()
    }
}

/// Entity-type tags encoded into generated identifiers
///
/// Tag values are persisted inside ids; never renumber an existing variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum EntityType {
    Organization = 1,
    Snapshot = 2,
    Vendor = 3,
    VendorContact = 4,
    VendorService = 5,
    VendorComplianceReport = 6,
    VendorBusinessAssociateAgreement = 7,
    VendorDataPrivacyAgreement = 8,
    VendorRiskAssessment = 9,
    Risk = 10,
    Asset = 11,
    Datum = 12,
    Obligation = 13,
    ContinualImprovement = 14,
    Nonconformity = 15,
    ProcessingActivity = 16,
    StateOfApplicability = 17,
}

impl EntityType {
    pub const ALL: [EntityType; 17] = [
        EntityType::Organization,
        EntityType::Snapshot,
        EntityType::Vendor,
        EntityType::VendorContact,
        EntityType::VendorService,
        EntityType::VendorComplianceReport,
        EntityType::VendorBusinessAssociateAgreement,
        EntityType::VendorDataPrivacyAgreement,
        EntityType::VendorRiskAssessment,
        EntityType::Risk,
        EntityType::Asset,
        EntityType::Datum,
        EntityType::Obligation,
        EntityType::ContinualImprovement,
        EntityType::Nonconformity,
        EntityType::ProcessingActivity,
        EntityType::StateOfApplicability,
    ];

    pub const fn tag(self) -> u16 {
        self as u16
    }

    pub fn from_tag(tag: u16) -> Result<Self, ProbityError> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.tag() == tag)
            .ok_or(ProbityError::UnknownEntityTag { tag })
    }
}

/// Globally unique, typed identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Gid([u8; 24]);

impl Gid {
    pub fn new(tenant: TenantId, entity_type: EntityType, timestamp_ms: u64, sequence: u64) -> Self {
        let mut bytes = [0u8; 24];
        bytes[0..8].copy_from_slice(tenant.as_bytes());
        bytes[8..10].copy_from_slice(&entity_type.tag().to_be_bytes());
        bytes[10..18].copy_from_slice(&timestamp_ms.to_be_bytes());
        bytes[18..24].copy_from_slice(&(sequence & SEQUENCE_MASK).to_be_bytes()[2..8]);
        Self(bytes)
    }

    pub fn tenant_id(&self) -> TenantId {
        let mut tenant = [0u8; 8];
        tenant.copy_from_slice(&self.0[0..8]);
        TenantId(tenant)
    }

    pub fn entity_tag(&self) -> u16 {
        u16::from_be_bytes([self.0[8], self.0[9]])
    }

    pub fn entity_type(&self) -> Result<EntityType, ProbityError> {
        EntityType::from_tag(self.entity_tag())
    }

    pub fn timestamp_ms(&self) -> u64 {
        let mut ts = [0u8; 8];
        ts.copy_from_slice(&self.0[10..18]);
        u64::from_be_bytes(ts)
    }

    pub fn sequence(&self) -> u64 {
        let mut seq = [0u8; 8];
        seq[2..8].copy_from_slice(&self.0[18..24]);
        u64::from_be_bytes(seq)
    }
}

impl fmt::Display for Gid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&URL_SAFE_NO_PAD.encode(self.0))
    }
}

impl FromStr for Gid {
    type Err = ProbityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ProbityError::InvalidGid {
            value: s.to_string(),
            reason: reason.to_string(),
        };
        let bytes = URL_SAFE_NO_PAD
            .decode(s)
            .map_err(|_| invalid("not base64url"))?;
        let bytes: [u8; 24] = bytes
            .try_into()
            .map_err(|_| invalid("expected 24 bytes"))?;
        let gid = Gid(bytes);
        gid.entity_type()?;
        Ok(gid)
    }
}

/// Identifier generator shared by every statement on a connection
///
/// The 48-bit sequence is a process-wide counter, so ids produced within one
/// statement (and within one millisecond) never repeat. The counter starts at
/// a random offset to keep separate processes apart.
#[derive(Debug)]
pub struct GidGenerator {
    sequence: AtomicU64,
}

impl GidGenerator {
    pub fn new() -> Self {
        let seed = uuid::Uuid::new_v4().as_u128() as u64;
        Self::with_seed(seed)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            sequence: AtomicU64::new(seed & SEQUENCE_MASK),
        }
    }

    pub fn generate(&self, tenant: TenantId, entity_type: EntityType) -> Gid {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let now_ms = chrono::Utc::now().timestamp_millis().max(0) as u64;
        Gid::new(tenant, entity_type, now_ms, sequence)
    }
}

impl Default for GidGenerator {
    fn default() -> Self {
        Self::new()
    }
}

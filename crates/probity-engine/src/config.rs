//! Engine configuration
//!
//! Loaded from TOML. Every field has a default and unknown keys are
//! rejected:
//!
//! ```toml
//! database_path = "probity.db"
//! transaction = "immediate"   # deferred | immediate | exclusive
//! orphans = "prune"           # prune | fail
//! log_profile = "production"  # development | production | test
//! ```

#![allow(clippy::result_large_err)]

use probity_core::errors::{ExError, ExErrorKind};
use probity_core::logging_facility::Profile;
use probity_core::policy::OrphanPolicy;
use probity_store::errors::Result;
use rusqlite::TransactionBehavior;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How the snapshot transaction is opened
///
/// `Immediate` takes the write lock up front, so every stage of a snapshot
/// reads the same database state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionMode {
    Deferred,
    #[default]
    Immediate,
    Exclusive,
}

impl TransactionMode {
    pub fn behavior(self) -> TransactionBehavior {
        match self {
            TransactionMode::Deferred => TransactionBehavior::Deferred,
            TransactionMode::Immediate => TransactionBehavior::Immediate,
            TransactionMode::Exclusive => TransactionBehavior::Exclusive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub database_path: PathBuf,
    pub transaction: TransactionMode,
    pub orphans: OrphanPolicy,
    pub log_profile: Profile,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("probity.db"),
            transaction: TransactionMode::default(),
            orphans: OrphanPolicy::default(),
            log_profile: Profile::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| {
            ExError::new(ExErrorKind::Config)
                .with_op("load_config")
                .with_message(e.to_string())
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ExError::new(ExErrorKind::Io)
                .with_op("load_config")
                .with_message(format!("{}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }
}

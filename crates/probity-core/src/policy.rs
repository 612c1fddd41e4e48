//! Orphan handling policy for foreign-key remapping
//!
//! When a row references an endpoint that has no copy under the target
//! snapshot, the remapping join cannot produce a copy of that row. The
//! policy decides whether that is acceptable.

use crate::errors::ProbityError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrphanPolicy {
    /// Drop the row, count it, and report the count in the stage result
    #[default]
    Prune,
    /// Abort the stage with `OrphanedRows` if any row would be dropped
    Fail,
}

impl OrphanPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            OrphanPolicy::Prune => "prune",
            OrphanPolicy::Fail => "fail",
        }
    }
}

impl fmt::Display for OrphanPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrphanPolicy {
    type Err = ProbityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prune" => Ok(OrphanPolicy::Prune),
            "fail" => Ok(OrphanPolicy::Fail),
            _ => Err(ProbityError::UnknownOrphanPolicy {
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_prune() {
        assert_eq!(OrphanPolicy::default(), OrphanPolicy::Prune);
    }

    #[test]
    fn test_parse() {
        assert_eq!("FAIL".parse::<OrphanPolicy>().unwrap(), OrphanPolicy::Fail);
        assert!("ignore".parse::<OrphanPolicy>().is_err());
    }
}

//! Snapshot stage plans
//!
//! Each aggregate copies its collections in a hand-curated order. A stage
//! that remaps foreign keys reads copies produced by earlier stages, so the
//! order is checked against [`Collection::requires`] whenever a plan is
//! built. A plan that would read copies that do not exist yet is rejected
//! before any SQL runs.

use crate::errors::ProbityError;
use crate::model::{Collection, SnapshotKind};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt::Display;
use std::hash::Hash;

/// Curated stage order for an aggregate
pub fn curated_stages(kind: SnapshotKind) -> &'static [Collection] {
    use Collection as C;
    match kind {
        SnapshotKind::Risks => &[C::Risks],
        SnapshotKind::Vendors => &[
            C::Vendors,
            C::VendorContacts,
            C::VendorServices,
            C::VendorComplianceReports,
            C::VendorBusinessAssociateAgreements,
            C::VendorDataPrivacyAgreements,
            C::VendorRiskAssessments,
        ],
        SnapshotKind::Assets => &[C::Assets, C::Vendors, C::AssetVendors],
        SnapshotKind::Data => &[C::Data, C::Vendors, C::DataVendors],
        SnapshotKind::Obligations => &[C::Obligations],
        SnapshotKind::ContinualImprovements => &[C::ContinualImprovements],
        SnapshotKind::Nonconformities => &[C::Nonconformities],
        SnapshotKind::ProcessingActivities => &[
            C::ProcessingActivities,
            C::Vendors,
            C::ProcessingActivityVendors,
        ],
        SnapshotKind::StatesOfApplicability => &[C::StatesOfApplicability],
    }
}

/// Check that every stage appears once and after everything it requires
pub fn validate_order_by<N, F>(stages: &[N], requires: F) -> Result<(), ProbityError>
where
    N: Copy + Eq + Hash + Display,
    F: Fn(N) -> Vec<N>,
{
    let mut done: HashSet<N> = HashSet::with_capacity(stages.len());
    for &stage in stages {
        if done.contains(&stage) {
            return Err(ProbityError::DuplicateStage {
                stage: stage.to_string(),
            });
        }
        if let Some(missing) = requires(stage).into_iter().find(|r| !done.contains(r)) {
            return Err(ProbityError::DependencyNotSatisfied {
                stage: stage.to_string(),
                requires: missing.to_string(),
            });
        }
        done.insert(stage);
    }
    Ok(())
}

/// Order `nodes` so that every node follows its requirements
///
/// Kahn's algorithm; among nodes that are ready at the same time the one
/// listed first in `nodes` wins, so the result is deterministic and equals
/// the input whenever the input is already valid. Every requirement must be
/// part of `nodes`.
pub fn topological_order_by<N, F>(nodes: &[N], requires: F) -> Result<Vec<N>, ProbityError>
where
    N: Copy + Eq + Hash + Display,
    F: Fn(N) -> Vec<N>,
{
    let mut position: HashMap<N, usize> = HashMap::with_capacity(nodes.len());
    for (i, &node) in nodes.iter().enumerate() {
        if position.insert(node, i).is_some() {
            return Err(ProbityError::DuplicateStage {
                stage: node.to_string(),
            });
        }
    }

    let mut pending = vec![0usize; nodes.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for (i, &node) in nodes.iter().enumerate() {
        for req in requires(node) {
            let Some(&j) = position.get(&req) else {
                return Err(ProbityError::DependencyNotSatisfied {
                    stage: node.to_string(),
                    requires: req.to_string(),
                });
            };
            pending[i] += 1;
            dependents[j].push(i);
        }
    }

    let mut ready: BTreeSet<usize> = (0..nodes.len()).filter(|&i| pending[i] == 0).collect();
    let mut order = Vec::with_capacity(nodes.len());
    while let Some(i) = ready.pop_first() {
        order.push(nodes[i]);
        for &d in &dependents[i] {
            pending[d] -= 1;
            if pending[d] == 0 {
                ready.insert(d);
            }
        }
    }

    if order.len() < nodes.len() {
        let stages = (0..nodes.len())
            .filter(|&i| pending[i] > 0)
            .map(|i| nodes[i].to_string())
            .collect();
        return Err(ProbityError::CyclicDependency { stages });
    }
    Ok(order)
}

pub fn validate_order(stages: &[Collection]) -> Result<(), ProbityError> {
    validate_order_by(stages, |c| c.requires().to_vec())
}

pub fn topological_order(collections: &[Collection]) -> Result<Vec<Collection>, ProbityError> {
    topological_order_by(collections, |c| c.requires().to_vec())
}

/// A validated, ordered list of collections for one aggregate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPlan {
    kind: SnapshotKind,
    stages: Vec<Collection>,
}

impl SnapshotPlan {
    /// The curated plan for `kind`
    pub fn for_kind(kind: SnapshotKind) -> Result<Self, ProbityError> {
        Self::from_stages(kind, curated_stages(kind).to_vec())
    }

    /// A caller-supplied order, rejected if it breaks the dependency graph
    pub fn from_stages(kind: SnapshotKind, stages: Vec<Collection>) -> Result<Self, ProbityError> {
        validate_order(&stages)?;
        Ok(Self { kind, stages })
    }

    /// The order derived from the dependency graph alone
    pub fn computed(kind: SnapshotKind) -> Result<Self, ProbityError> {
        let stages = topological_order(curated_stages(kind))?;
        Ok(Self { kind, stages })
    }

    pub fn kind(&self) -> SnapshotKind {
        self.kind
    }

    pub fn stages(&self) -> &[Collection] {
        &self.stages
    }

    /// Reverse order: dependents before the rows they reference
    pub fn deletion_order(&self) -> Vec<Collection> {
        self.stages.iter().rev().copied().collect()
    }
}

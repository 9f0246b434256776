use crate::key::PolicyKey;
use crate::model::{ExpertRecord, PolicyEntry, SpecialConsiderations};
use crate::raw::PolicyTable;
use crate::types::{Dimension, Phase};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Immutable, fully normalised view of the three datasets.
///
/// Built once at startup. A reload replaces the whole catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    policies: PolicyTable,
    experts: Vec<ExpertRecord>,
    considerations: SpecialConsiderations,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CatalogStatistics {
    pub total_dimensions: usize,
    pub total_policies: usize,
    pub total_experts: usize,
    pub policies_per_dimension: BTreeMap<String, usize>,
}

impl Catalog {
    pub fn new(
        policies: PolicyTable,
        experts: Vec<ExpertRecord>,
        considerations: SpecialConsiderations,
    ) -> Self {
        Self {
            policies,
            experts,
            considerations,
        }
    }

    /// Every policy in catalog iteration order.
    pub fn policies(&self) -> &[PolicyEntry] {
        self.policies.entries()
    }

    pub fn policy(&self, key: &PolicyKey) -> Option<&PolicyEntry> {
        self.policies.get(key)
    }

    pub fn contains(&self, key: &PolicyKey) -> bool {
        self.policies.get(key).is_some()
    }

    pub fn policies_at(
        &self,
        dimension: Dimension,
        phase: Phase,
    ) -> impl Iterator<Item = &PolicyEntry> + '_ {
        self.policies()
            .iter()
            .filter(move |entry| entry.key.in_cell(dimension, phase))
    }

    pub fn policies_in(&self, dimension: Dimension) -> impl Iterator<Item = &PolicyEntry> + '_ {
        self.policies()
            .iter()
            .filter(move |entry| entry.key.dimension == dimension)
    }

    /// First key carrying the bare policy id, in catalog order.
    pub fn locate(&self, policy_id: &str) -> Option<&PolicyKey> {
        self.policies()
            .iter()
            .map(|entry| &entry.key)
            .find(|key| key.policy_id == policy_id)
    }

    pub fn experts(&self) -> &[ExpertRecord] {
        &self.experts
    }

    pub fn considerations(&self) -> &SpecialConsiderations {
        &self.considerations
    }

    /// Sorted keyword vocabulary across all policies.
    pub fn all_keywords(&self) -> Vec<String> {
        self.policies()
            .iter()
            .flat_map(|entry| entry.record.keywords.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn statistics(&self) -> CatalogStatistics {
        let mut per_dimension: BTreeMap<String, usize> = BTreeMap::new();
        for entry in self.policies() {
            *per_dimension
                .entry(entry.key.dimension.id().to_string())
                .or_default() += 1;
        }
        CatalogStatistics {
            total_dimensions: per_dimension.len(),
            total_policies: self.policies.len(),
            total_experts: self.experts.len(),
            policies_per_dimension: per_dimension,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

use crate::considerations::{considerations_for, ConsiderationsView};
use crate::error::{Result, SearchError};
use crate::experts::{match_experts, plan_keywords, ExpertMatch};
use crate::filter::{global_filter, listing, FilterCriteria, PolicyListing};
use crate::fuzzy::KeywordFinder;
use crate::matrix::{selection_matrix, PlanCoverage, SelectionMatrix};
use crate::profile::{EngineProfile, RelatedConfig};
use crate::related::{related_policies, RelatedPolicy};
use crate::report::{plan_report, PlanReport};
use crate::suggest::{suggest, PlanSuggestions};
use policy_catalog::{Catalog, Dimension, Phase, PolicyEntry, PolicyKey};
use policy_state::SelectionState;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Read-only derivations over a catalog, parameterised by an [`EngineProfile`].
///
/// Nothing here mutates [`SelectionState`] except the navigation helpers.
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    catalog: Arc<Catalog>,
    profile: EngineProfile,
}

impl PolicyEngine {
    pub fn new(catalog: impl Into<Arc<Catalog>>, profile: EngineProfile) -> Self {
        Self {
            catalog: catalog.into(),
            profile,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn profile(&self) -> &EngineProfile {
        &self.profile
    }

    /// Swaps in a freshly loaded catalog; there is no merging.
    pub fn replace_catalog(&mut self, catalog: impl Into<Arc<Catalog>>) {
        self.catalog = catalog.into();
        log::info!("Catalog replaced ({} policies)", self.catalog.policies().len());
    }

    pub fn listing(&self, state: &SelectionState) -> PolicyListing<'_> {
        listing(&self.catalog, state)
    }

    pub fn filter(&self, criteria: &FilterCriteria) -> Vec<&PolicyEntry> {
        global_filter(&self.catalog, criteria)
    }

    pub fn related(&self, key: &PolicyKey) -> Result<Vec<RelatedPolicy>> {
        self.related_with(key, &self.profile.related)
    }

    pub fn related_with_limit(&self, key: &PolicyKey, limit: usize) -> Result<Vec<RelatedPolicy>> {
        let config = RelatedConfig {
            limit,
            ..self.profile.related.clone()
        };
        self.related_with(key, &config)
    }

    fn related_with(&self, key: &PolicyKey, config: &RelatedConfig) -> Result<Vec<RelatedPolicy>> {
        let focal = self
            .catalog
            .policy(key)
            .ok_or_else(|| SearchError::UnknownPolicy(key.clone()))?;
        Ok(related_policies(&self.catalog, focal, config))
    }

    /// `limit` defaults to the profile's expert limit.
    pub fn experts_for<S: AsRef<str>>(&self, keywords: &[S], limit: Option<usize>) -> Vec<ExpertMatch<'_>> {
        let limit = limit.unwrap_or(self.profile.experts.limit);
        match_experts(self.catalog.experts(), keywords, limit)
    }

    pub fn plan_experts(&self, plan: &BTreeSet<PolicyKey>) -> Vec<ExpertMatch<'_>> {
        let keywords = plan_keywords(&self.catalog, plan);
        match_experts(self.catalog.experts(), &keywords, self.profile.experts.plan_limit)
    }

    pub fn considerations(&self, dimension: Dimension, phase: Phase) -> ConsiderationsView<'_> {
        considerations_for(self.catalog.considerations(), dimension, phase)
    }

    pub fn matrix(&self, state: &SelectionState) -> SelectionMatrix {
        selection_matrix(state, &self.profile.matrix)
    }

    pub fn coverage(&self, plan: &BTreeSet<PolicyKey>) -> PlanCoverage {
        PlanCoverage::from_plan(plan)
    }

    pub fn keyword_finder(&self) -> KeywordFinder {
        KeywordFinder::new(self.catalog.all_keywords())
    }

    pub fn plan_report(&self, plan: &BTreeSet<PolicyKey>) -> PlanReport {
        plan_report(&self.catalog, plan, self.profile.experts.plan_limit)
    }

    pub fn suggestions(&self, plan: &BTreeSet<PolicyKey>) -> PlanSuggestions {
        suggest(&self.catalog, plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use policy_catalog::{ExpertRecord, PolicyRecord, PolicyTable, SpecialConsiderations};
    use pretty_assertions::assert_eq;

    fn engine() -> PolicyEngine {
        let table: PolicyTable = vec![
            (
                PolicyKey::new(Dimension::EnablingInfrastructure, Phase::Design, "P1"),
                PolicyRecord::new("Data exchange", "").keywords(["privacy", "data"]),
            ),
            (
                PolicyKey::new(Dimension::LegislationPolicy, Phase::Design, "P2"),
                PolicyRecord::new("Privacy act", "").keywords(["privacy", "rights"]),
            ),
        ]
        .into_iter()
        .collect();
        let experts = vec![
            ExpertRecord::new("Ana", "").keywords(["rights"]),
            ExpertRecord::new("Ben", "").keywords(["data"]),
            ExpertRecord::new("Chi", "").keywords(["privacy", "data privacy"]),
            ExpertRecord::new("Dee", ""),
        ];
        PolicyEngine::new(
            Catalog::new(table, experts, SpecialConsiderations::default()),
            EngineProfile::default(),
        )
    }

    #[test]
    fn related_rejects_unknown_focal() {
        let engine = engine();
        let missing = PolicyKey::new(Dimension::LegislationPolicy, Phase::Design, "P9");
        assert!(matches!(
            engine.related(&missing),
            Err(SearchError::UnknownPolicy(_))
        ));
    }

    #[test]
    fn related_limit_override() {
        let engine = engine();
        let key = PolicyKey::new(Dimension::EnablingInfrastructure, Phase::Design, "P1");
        assert_eq!(engine.related(&key).unwrap().len(), 1);
        assert!(engine.related_with_limit(&key, 0).unwrap().is_empty());
    }

    #[test]
    fn plan_experts_use_plan_limit() {
        let engine = engine();
        let plan: BTreeSet<PolicyKey> = engine
            .catalog()
            .policies()
            .iter()
            .map(|e| e.key.clone())
            .collect();
        let names: Vec<&str> = engine
            .plan_experts(&plan)
            .iter()
            .map(|m| m.expert.name.as_str())
            .collect();
        assert_eq!(names, vec!["Chi", "Ana", "Ben"]);
    }

    #[test]
    fn replace_catalog_swaps_everything() {
        let mut engine = engine();
        engine.replace_catalog(Catalog::default());
        assert!(engine.catalog().is_empty());
        assert!(engine.keyword_finder().is_empty());
    }
}

use crate::matching::shared_keywords;
use crate::profile::RelatedConfig;
use policy_catalog::{Catalog, PolicyEntry, PolicyKey};
use serde::Serialize;

/// A policy sharing at least one keyword with the focal policy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedPolicy {
    pub key: PolicyKey,
    pub title: String,
    /// Focal keywords (lower-cased) that matched the candidate.
    pub shared_keywords: Vec<String>,
    pub score: f64,
    pub cross_dimension: bool,
}

/// Ranks every other catalog policy by keyword overlap with `focal`.
///
/// Score is `shared / max(|focal|, |candidate|)` plus a flat bonus when the
/// candidate lives in another dimension. Ties keep catalog order.
pub fn related_policies(
    catalog: &Catalog,
    focal: &PolicyEntry,
    config: &RelatedConfig,
) -> Vec<RelatedPolicy> {
    let focal_keywords = focal.record.lowercase_keywords();
    if focal_keywords.is_empty() {
        return Vec::new();
    }

    let mut related: Vec<RelatedPolicy> = catalog
        .policies()
        .iter()
        .filter(|candidate| candidate.key != focal.key)
        .filter_map(|candidate| {
            let candidate_keywords = candidate.record.lowercase_keywords();
            let shared = shared_keywords(&focal_keywords, &candidate_keywords);
            if shared.is_empty() || shared.len() < config.min_shared {
                return None;
            }
            let denominator = focal_keywords.len().max(candidate_keywords.len());
            let cross_dimension = candidate.key.dimension != focal.key.dimension;
            let mut score = shared.len() as f64 / denominator as f64;
            if cross_dimension {
                score += config.cross_dimension_bonus;
            }
            Some(RelatedPolicy {
                key: candidate.key.clone(),
                title: candidate.record.title.clone(),
                shared_keywords: shared,
                score,
                cross_dimension,
            })
        })
        .collect();

    related.sort_by(|a, b| b.score.total_cmp(&a.score));
    related.truncate(config.limit);
    log::debug!(
        "related policies for {}: {} match(es)",
        focal.key,
        related.len()
    );
    related
}

pub fn related_keys(related: &[RelatedPolicy]) -> Vec<PolicyKey> {
    related.iter().map(|r| r.key.clone()).collect()
}

use crate::matching::{lowercase_all, overlap_pairs};
use policy_catalog::{Catalog, ExpertRecord, PolicyKey};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpertMatch<'a> {
    pub expert: &'a ExpertRecord,
    /// Matching (keyword, expert keyword) pairs; zero for fallback entries.
    pub score: usize,
}

/// Ranks experts by keyword overlap.
///
/// Falls back to the first `limit` experts in catalog order when `keywords`
/// is empty or nothing scores, so the result is only empty when the catalog
/// has no experts.
pub fn match_experts<'a, S: AsRef<str>>(
    experts: &'a [ExpertRecord],
    keywords: &[S],
    limit: usize,
) -> Vec<ExpertMatch<'a>> {
    let wanted = lowercase_all(keywords);
    let mut scored: Vec<ExpertMatch<'a>> = if wanted.is_empty() {
        Vec::new()
    } else {
        experts
            .iter()
            .filter_map(|expert| {
                let score = overlap_pairs(&wanted, &lowercase_all(&expert.keywords));
                (score > 0).then_some(ExpertMatch { expert, score })
            })
            .collect()
    };

    if scored.is_empty() {
        log::debug!("no expert scored, falling back to first {limit}");
        return experts
            .iter()
            .take(limit)
            .map(|expert| ExpertMatch { expert, score: 0 })
            .collect();
    }

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(limit);
    scored
}

/// Keywords of every plan policy, first occurrence wins, in plan order.
pub fn plan_keywords<'k>(
    catalog: &Catalog,
    plan: impl IntoIterator<Item = &'k PolicyKey>,
) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for key in plan {
        let Some(entry) = catalog.policy(key) else {
            log::debug!("plan policy {key} not in catalog, skipped for expert matching");
            continue;
        };
        for keyword in &entry.record.keywords {
            if !keywords.contains(keyword) {
                keywords.push(keyword.clone());
            }
        }
    }
    keywords
}

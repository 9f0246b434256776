use crate::matching::{keywords_overlap, lowercase_all};
use policy_catalog::{Catalog, Dimension, Phase, PolicyEntry, PolicyRecord};
use policy_state::SelectionState;
use serde::{Deserialize, Serialize};

/// Inputs of the global filter. Every active part must pass (conjunction).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub dimension: Option<Dimension>,
    #[serde(default)]
    pub phase: Option<Phase>,
    #[serde(default)]
    pub search_term: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl FilterCriteria {
    pub fn from_state(state: &SelectionState) -> Self {
        Self {
            dimension: state.selected_dimension(),
            phase: state.selected_phase(),
            search_term: state.search_term().to_string(),
            keywords: state.active_keywords().iter().cloned().collect(),
        }
    }

    pub fn has_text_or_keywords(&self) -> bool {
        !self.search_term.is_empty() || !self.keywords.is_empty()
    }
}

/// Lower-cased form of the criteria, computed once per scan.
struct PreparedCriteria {
    dimension: Option<Dimension>,
    phase: Option<Phase>,
    term: String,
    keywords: Vec<String>,
}

impl PreparedCriteria {
    fn new(criteria: &FilterCriteria) -> Self {
        Self {
            dimension: criteria.dimension,
            phase: criteria.phase,
            term: criteria.search_term.to_lowercase(),
            keywords: lowercase_all(&criteria.keywords),
        }
    }

    fn accepts(&self, entry: &PolicyEntry) -> bool {
        self.dimension.map_or(true, |d| d == entry.key.dimension)
            && self.phase.map_or(true, |p| p == entry.key.phase)
            && matches_text(&entry.record, &self.term)
            && matches_keywords(&entry.record, &self.keywords)
    }
}

/// `term` must be lower-cased. An empty term matches everything.
///
/// The term is looked up in "title description examples" as one string, so a
/// phrase may run from one field into the next.
pub fn matches_text(record: &PolicyRecord, term: &str) -> bool {
    term.is_empty() || record.search_text().contains(term)
}

/// `active` must be lower-cased. No active keyword matches everything.
pub fn matches_keywords(record: &PolicyRecord, active: &[String]) -> bool {
    if active.is_empty() {
        return true;
    }
    let own = record.lowercase_keywords();
    active
        .iter()
        .any(|keyword| own.iter().any(|k| keywords_overlap(keyword, k)))
}

/// Full catalog scan in catalog order.
pub fn global_filter<'a>(catalog: &'a Catalog, criteria: &FilterCriteria) -> Vec<&'a PolicyEntry> {
    let prepared = PreparedCriteria::new(criteria);
    let hits: Vec<&PolicyEntry> = catalog
        .policies()
        .iter()
        .filter(|entry| prepared.accepts(entry))
        .collect();
    log::debug!(
        "global filter term={:?} keywords={} -> {} of {}",
        criteria.search_term,
        criteria.keywords.len(),
        hits.len(),
        catalog.policies().len()
    );
    hits
}

/// What the policy list shows for the current selection.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PolicyListing<'a> {
    /// Search or keyword filters active, optionally narrowed by dimension/phase.
    Filtered {
        criteria: FilterCriteria,
        policies: Vec<&'a PolicyEntry>,
    },
    /// Exactly the policies of one cell.
    Cell {
        dimension: Dimension,
        phase: Phase,
        policies: Vec<&'a PolicyEntry>,
    },
    /// Every phase of one dimension; each entry carries its phase in its key.
    Dimension {
        dimension: Dimension,
        policies: Vec<&'a PolicyEntry>,
    },
    Empty,
}

impl<'a> PolicyListing<'a> {
    pub fn policies(&self) -> &[&'a PolicyEntry] {
        match self {
            PolicyListing::Filtered { policies, .. }
            | PolicyListing::Cell { policies, .. }
            | PolicyListing::Dimension { policies, .. } => policies,
            PolicyListing::Empty => &[],
        }
    }

    /// Keeps at most `limit` policies; the listing mode is unchanged.
    pub fn truncate(&mut self, limit: usize) {
        match self {
            PolicyListing::Filtered { policies, .. }
            | PolicyListing::Cell { policies, .. }
            | PolicyListing::Dimension { policies, .. } => policies.truncate(limit),
            PolicyListing::Empty => {}
        }
    }
}

pub fn listing<'a>(catalog: &'a Catalog, state: &SelectionState) -> PolicyListing<'a> {
    let criteria = FilterCriteria::from_state(state);
    if criteria.has_text_or_keywords() {
        let policies = global_filter(catalog, &criteria);
        return PolicyListing::Filtered { criteria, policies };
    }
    match (state.selected_dimension(), state.selected_phase()) {
        (Some(dimension), Some(phase)) => PolicyListing::Cell {
            dimension,
            phase,
            policies: catalog.policies_at(dimension, phase).collect(),
        },
        (Some(dimension), None) => PolicyListing::Dimension {
            dimension,
            policies: catalog.policies_in(dimension).collect(),
        },
        _ => PolicyListing::Empty,
    }
}

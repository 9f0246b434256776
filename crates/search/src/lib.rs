//! # Policy Search
//!
//! Pure derivations over a [`policy_catalog::Catalog`] and a
//! [`policy_state::SelectionState`]:
//!
//! - **Filtering**: text and keyword filters narrowed by dimension/phase
//! - **Cross-referencing**: related policies ranked by keyword overlap
//! - **Experts**: pair-count ranking with a deterministic fallback
//! - **Matrix**: per-cell bars for the plan and the current relations
//! - **Plan tooling**: coverage, suggestions and a printable report
//!
//! ```text
//! SelectionState ──┐
//!                  ├──> PolicyEngine ──> listing / related / experts / matrix
//! Catalog ─────────┘         │
//!                            └── EngineProfile (limits, bonus, geometry)
//! ```
//!
//! Keyword matching everywhere is bidirectional substring containment on
//! lower-cased text (see [`keywords_match`]).

mod considerations;
mod engine;
mod error;
mod experts;
mod filter;
mod fuzzy;
mod matching;
mod matrix;
mod navigation;
mod profile;
mod related;
mod report;
mod suggest;

pub use considerations::{considerations_for, CategorisedItem, ConsiderationsView};
pub use engine::PolicyEngine;
pub use error::{Result, SearchError};
pub use experts::{match_experts, plan_keywords, ExpertMatch};
pub use filter::{global_filter, listing, matches_keywords, matches_text, FilterCriteria, PolicyListing};
pub use fuzzy::{KeywordFinder, KeywordHit};
pub use matching::{keywords_match, keywords_overlap};
pub use matrix::{
    bar_height, plan_coverage, selection_matrix, BarKind, MatrixBar, MatrixCell, PlanCoverage,
    SelectionMatrix,
};
pub use profile::{
    EngineProfile, ExpertsConfig, MatrixGeometry, RelatedConfig, SearchConfig,
    DEFAULT_CROSS_DIMENSION_BONUS, DEFAULT_DEBOUNCE_MS, DEFAULT_EXPERT_LIMIT,
    DEFAULT_PLAN_EXPERT_LIMIT, DEFAULT_RELATED_LIMIT,
};
pub use related::{related_keys, related_policies, RelatedPolicy};
pub use report::{plan_report, PlanReport, ReportItem, ReportSection};
pub use suggest::{
    suggest, GapKind, GapSuggestion, PlanSuggestions, Priority, SmartTemplate, TemplateSuggestion,
    SMART_TEMPLATES,
};

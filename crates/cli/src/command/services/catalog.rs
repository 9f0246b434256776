use crate::command::domain::{
    parse_payload, CommandAction, CommandOutcome, EmptyPayload, Hint, HintKind, KeywordsPayload,
    DEFAULT_KEYWORD_LIMIT,
};
use anyhow::Result;
use policy_search::PolicyEngine;
use serde_json::Value;

pub(crate) struct CatalogService;

impl CatalogService {
    pub fn stats(&self, engine: &PolicyEngine, payload: Value) -> Result<CommandOutcome> {
        let _: EmptyPayload = parse_payload(CommandAction::Stats, payload)?;
        let stats = engine.catalog().statistics();
        let empty = stats.total_policies == 0;
        let outcome = CommandOutcome::from_value(stats)?;
        Ok(if empty {
            outcome.with_hint(Hint::new(HintKind::Warn, "The policy catalog is empty."))
        } else {
            outcome
        })
    }

    /// Whole vocabulary, or fuzzy hits when a query is given.
    pub fn keywords(&self, engine: &PolicyEngine, payload: Value) -> Result<CommandOutcome> {
        let payload: KeywordsPayload = parse_payload(CommandAction::Keywords, payload)?;
        match payload.query {
            Some(query) => {
                let limit = payload.limit.unwrap_or(DEFAULT_KEYWORD_LIMIT);
                let hits = engine.keyword_finder().find(&query, limit);
                let mut outcome = CommandOutcome::from_value(&hits)?;
                outcome.meta.total = Some(hits.len());
                Ok(outcome)
            }
            None => {
                let mut keywords = engine.catalog().all_keywords();
                let total = keywords.len();
                if let Some(limit) = payload.limit {
                    keywords.truncate(limit);
                }
                let truncated = keywords.len() < total;
                let mut outcome = CommandOutcome::from_value(keywords)?;
                outcome.meta.total = Some(total);
                outcome.meta.truncated = Some(truncated);
                Ok(outcome)
            }
        }
    }
}

use crate::command::domain::{
    parse_key, parse_payload, CommandAction, CommandOutcome, ConsiderationsPayload,
    ExpertsPayload, FilterPayload, Hint, HintKind, ListPayload, RelatedPayload,
    DEFAULT_LIST_LIMIT,
};
use crate::command::services::restore_state;
use anyhow::Result;
use policy_catalog::{Dimension, Phase};
use policy_search::{PolicyEngine, PolicyListing};
use serde_json::{json, Value};

pub(crate) struct BrowseService;

impl BrowseService {
    /// What the policy list shows for the snapshot's selection.
    pub fn list(&self, engine: &PolicyEngine, payload: Value) -> Result<CommandOutcome> {
        let payload: ListPayload = parse_payload(CommandAction::List, payload)?;
        let state = restore_state(engine, payload.state);
        let mut listing = engine.listing(&state);
        let total = listing.policies().len();
        let empty_selection = matches!(listing, PolicyListing::Empty);
        listing.truncate(payload.limit.unwrap_or(DEFAULT_LIST_LIMIT));

        let mut outcome = CommandOutcome::from_value(&listing)?;
        outcome.meta.total = Some(total);
        if !empty_selection {
            outcome.meta.truncated = Some(listing.policies().len() < total);
        }
        if empty_selection {
            outcome = outcome.with_hint(Hint::new(
                HintKind::Info,
                "Nothing selected: set selectedDimension, a search term or keywords in payload.state.",
            ));
        }
        Ok(outcome)
    }

    pub fn filter(&self, engine: &PolicyEngine, payload: Value) -> Result<CommandOutcome> {
        let payload: FilterPayload = parse_payload(CommandAction::Filter, payload)?;
        let mut hits = engine.filter(&payload.criteria());
        let total = hits.len();
        hits.truncate(payload.limit.unwrap_or(DEFAULT_LIST_LIMIT));

        let mut outcome = CommandOutcome::from_value(&hits)?;
        outcome.meta.total = Some(total);
        outcome.meta.truncated = Some(hits.len() < total);
        Ok(outcome)
    }

    pub fn related(&self, engine: &PolicyEngine, payload: Value) -> Result<CommandOutcome> {
        let payload: RelatedPayload = parse_payload(CommandAction::Related, payload)?;
        let key = parse_key(&payload.key)?;
        let related = match payload.limit {
            Some(limit) => engine.related_with_limit(&key, limit)?,
            None => engine.related(&key)?,
        };

        let mut outcome = CommandOutcome::from_value(&related)?;
        outcome.meta.total = Some(related.len());
        if let Some(first) = related.first() {
            outcome.next_actions.push(policy_protocol::ToolNextAction {
                tool: CommandAction::Related.as_str().to_string(),
                args: json!({ "key": first.key }),
                reason: "Follow the strongest relation.".to_string(),
            });
        }
        Ok(outcome)
    }

    pub fn experts(&self, engine: &PolicyEngine, payload: Value) -> Result<CommandOutcome> {
        let payload: ExpertsPayload = parse_payload(CommandAction::Experts, payload)?;
        let matches = engine.experts_for(&payload.keywords, payload.limit);
        let mut outcome = CommandOutcome::from_value(&matches)?;
        outcome.meta.total = Some(matches.len());
        Ok(outcome)
    }

    pub fn considerations(&self, engine: &PolicyEngine, payload: Value) -> Result<CommandOutcome> {
        let payload: ConsiderationsPayload =
            parse_payload(CommandAction::Considerations, payload)?;
        let dimension: Dimension = payload.dimension.parse()?;
        let phase: Phase = payload.phase.parse()?;
        CommandOutcome::from_value(engine.considerations(dimension, phase))
    }
}

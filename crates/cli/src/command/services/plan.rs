use crate::command::domain::{
    parse_payload, CommandAction, CommandOutcome, Hint, HintKind, PlanPayload, ReportFormat,
    StatePayload,
};
use crate::command::services::{resolve_plan, restore_state};
use anyhow::Result;
use policy_search::PolicyEngine;
use serde_json::{json, Value};

pub(crate) struct PlanService;

impl PlanService {
    pub fn experts(&self, engine: &PolicyEngine, payload: Value) -> Result<CommandOutcome> {
        let payload: PlanPayload = parse_payload(CommandAction::PlanExperts, payload)?;
        let plan = resolve_plan(&payload)?;
        let matches = engine.plan_experts(&plan);
        let mut outcome = CommandOutcome::from_value(&matches)?;
        outcome.meta.total = Some(matches.len());
        Ok(outcome)
    }

    pub fn matrix(&self, engine: &PolicyEngine, payload: Value) -> Result<CommandOutcome> {
        let payload: StatePayload = parse_payload(CommandAction::Matrix, payload)?;
        let state = restore_state(engine, payload.state);
        let matrix = engine.matrix(&state);
        let coverage = engine.coverage(state.selected_policies());
        CommandOutcome::from_value(json!({ "matrix": matrix, "coverage": coverage }))
    }

    pub fn report(&self, engine: &PolicyEngine, payload: Value) -> Result<CommandOutcome> {
        let payload: PlanPayload = parse_payload(CommandAction::PlanReport, payload)?;
        let plan = resolve_plan(&payload)?;
        let report = engine.plan_report(&plan);

        let mut outcome = match payload.format {
            ReportFormat::Json => CommandOutcome::from_value(&report)?,
            ReportFormat::Markdown => {
                CommandOutcome::from_value(json!({ "markdown": report.to_markdown() }))?
            }
        };
        if !report.missing.is_empty() {
            outcome = outcome.with_hint(Hint::new(
                HintKind::Warn,
                format!(
                    "{} plan policies are not in the catalog and were left out.",
                    report.missing.len()
                ),
            ));
        }
        Ok(outcome)
    }

    pub fn suggestions(&self, engine: &PolicyEngine, payload: Value) -> Result<CommandOutcome> {
        let payload: PlanPayload = parse_payload(CommandAction::Suggestions, payload)?;
        let plan = resolve_plan(&payload)?;
        CommandOutcome::from_value(engine.suggestions(&plan))
    }
}

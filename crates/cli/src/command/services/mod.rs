mod browse;
mod capabilities;
mod catalog;
mod plan;

use crate::command::domain::{parse_key, CommandAction, CommandOutcome, PlanPayload};
use anyhow::Result;
use policy_catalog::PolicyKey;
use policy_protocol::SourceStatus;
use policy_search::{related_keys, PolicyEngine};
use policy_state::{SelectionSnapshot, SelectionState};
use serde_json::Value;
use std::collections::BTreeSet;

pub struct Services {
    capabilities: capabilities::CapabilitiesService,
    catalog: catalog::CatalogService,
    browse: browse::BrowseService,
    plan: plan::PlanService,
    engine: PolicyEngine,
}

impl Services {
    pub fn new(engine: PolicyEngine, status: SourceStatus) -> Self {
        Self {
            capabilities: capabilities::CapabilitiesService::new(status),
            catalog: catalog::CatalogService,
            browse: browse::BrowseService,
            plan: plan::PlanService,
            engine,
        }
    }

    pub fn route(&self, action: CommandAction, payload: Value) -> Result<CommandOutcome> {
        let engine = &self.engine;
        match action {
            CommandAction::Capabilities => self.capabilities.run(engine, payload),
            CommandAction::Stats => self.catalog.stats(engine, payload),
            CommandAction::Keywords => self.catalog.keywords(engine, payload),
            CommandAction::List => self.browse.list(engine, payload),
            CommandAction::Filter => self.browse.filter(engine, payload),
            CommandAction::Related => self.browse.related(engine, payload),
            CommandAction::Experts => self.browse.experts(engine, payload),
            CommandAction::Considerations => self.browse.considerations(engine, payload),
            CommandAction::PlanExperts => self.plan.experts(engine, payload),
            CommandAction::Matrix => self.plan.matrix(engine, payload),
            CommandAction::PlanReport => self.plan.report(engine, payload),
            CommandAction::Suggestions => self.plan.suggestions(engine, payload),
        }
    }
}

/// Rebuilds a selection from a snapshot and recomputes its relations,
/// which snapshots never carry.
pub(crate) fn restore_state(engine: &PolicyEngine, snapshot: Option<SelectionSnapshot>) -> SelectionState {
    let mut state = SelectionState::from_snapshot(snapshot.unwrap_or_default());
    if let Some(key) = state.current_policy_key() {
        match engine.related(&key) {
            Ok(related) => state.set_related_policies(related_keys(&related)),
            Err(err) => log::debug!("snapshot focal policy not recomputed: {err}"),
        }
    }
    state
}

/// Explicit `plan` keys win over the snapshot's plan.
pub(crate) fn resolve_plan(payload: &PlanPayload) -> Result<BTreeSet<PolicyKey>> {
    if let Some(plan) = &payload.plan {
        return plan.iter().map(|raw| parse_key(raw)).collect();
    }
    Ok(payload
        .state
        .as_ref()
        .map(|state| state.selected_policies.iter().cloned().collect())
        .unwrap_or_default())
}

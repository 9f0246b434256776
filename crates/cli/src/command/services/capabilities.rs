use crate::command::domain::{parse_payload, CommandAction, CommandOutcome, EmptyPayload};
use anyhow::Result;
use policy_catalog::{Dimension, Phase};
use policy_protocol::{
    Capabilities, CapabilitiesServer, DefaultLimits, SourceStatus, ToolNextAction,
    CAPABILITIES_SCHEMA_VERSION, POLICY_KEY_SEPARATOR,
};
use policy_search::PolicyEngine;
use serde_json::{json, Value};

pub(crate) struct CapabilitiesService {
    status: SourceStatus,
}

impl CapabilitiesService {
    pub fn new(status: SourceStatus) -> Self {
        Self { status }
    }

    pub fn run(&self, engine: &PolicyEngine, payload: Value) -> Result<CommandOutcome> {
        let _: EmptyPayload = parse_payload(CommandAction::Capabilities, payload)?;
        let profile = engine.profile();
        let output = Capabilities {
            schema_version: CAPABILITIES_SCHEMA_VERSION,
            server: CapabilitiesServer {
                name: "policy-tool".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            actions: CommandAction::ALL
                .iter()
                .map(|action| action.as_str().to_string())
                .collect(),
            dimensions: Dimension::ALL.iter().map(|d| d.id().to_string()).collect(),
            phases: Phase::ALL.iter().map(|p| p.id().to_string()).collect(),
            key_separator: POLICY_KEY_SEPARATOR.to_string(),
            default_limits: DefaultLimits {
                related: profile.related.limit,
                experts: profile.experts.limit,
                plan_experts: profile.experts.plan_limit,
                debounce_ms: profile.search.debounce_ms,
            },
            sources: self.status,
        };

        let mut outcome = CommandOutcome::from_value(output)?;
        outcome.next_actions.push(ToolNextAction {
            tool: CommandAction::Stats.as_str().to_string(),
            args: json!({}),
            reason: "See how many policies each dimension holds.".to_string(),
        });
        Ok(outcome)
    }
}

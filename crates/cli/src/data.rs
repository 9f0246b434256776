use crate::config::ResolvedConfig;
use anyhow::Result;
use policy_catalog::load_all;
use policy_protocol::SourceStatus;
use policy_search::PolicyEngine;

/// Engine plus the availability of each dataset it was built from.
#[derive(Debug, Clone)]
pub struct LoadedEngine {
    pub engine: PolicyEngine,
    pub status: SourceStatus,
}

impl LoadedEngine {
    /// Human-readable notes for datasets that failed to load.
    pub fn degraded_notes(&self) -> Vec<String> {
        let mut notes = Vec::new();
        if !self.status.experts {
            notes.push("Experts data unavailable: expert matching returns no results".to_string());
        }
        if !self.status.considerations {
            notes.push(
                "Special considerations unavailable: considerations lookups are empty".to_string(),
            );
        }
        notes
    }
}

/// Reads all datasets. Only a policy-data failure is an error.
pub async fn load_engine(config: &ResolvedConfig) -> Result<LoadedEngine> {
    let report = load_all(&config.sources).await?;
    Ok(LoadedEngine {
        engine: PolicyEngine::new(report.catalog, config.profile.clone()),
        status: report.status,
    })
}

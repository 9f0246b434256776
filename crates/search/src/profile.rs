use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_RELATED_LIMIT: usize = 5;
pub const DEFAULT_CROSS_DIMENSION_BONUS: f64 = 0.1;
pub const DEFAULT_EXPERT_LIMIT: usize = 4;
pub const DEFAULT_PLAN_EXPERT_LIMIT: usize = 3;
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Tunables of the matching engine, loadable from TOML.
///
/// Every section is optional. Unknown top-level tables are ignored so the
/// same file can carry settings for the outer binary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineProfile {
    pub schema_version: Option<u32>,
    pub related: RelatedConfig,
    pub experts: ExpertsConfig,
    pub matrix: MatrixGeometry,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelatedConfig {
    pub limit: usize,
    pub cross_dimension_bonus: f64,
    pub min_shared: usize,
}

impl Default for RelatedConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_RELATED_LIMIT,
            cross_dimension_bonus: DEFAULT_CROSS_DIMENSION_BONUS,
            min_shared: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExpertsConfig {
    pub limit: usize,
    pub plan_limit: usize,
}

impl Default for ExpertsConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_EXPERT_LIMIT,
            plan_limit: DEFAULT_PLAN_EXPERT_LIMIT,
        }
    }
}

/// Fixed envelope the matrix bars of one cell must fit into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatrixGeometry {
    pub max_cell_height: u32,
    pub min_bar_height: u32,
    pub max_bar_height: u32,
    pub gap_height: u32,
}

impl Default for MatrixGeometry {
    fn default() -> Self {
        Self {
            max_cell_height: 52,
            min_bar_height: 4,
            max_bar_height: 16,
            gap_height: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl EngineProfile {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let profile: Self = toml::from_str(raw)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(version) = self.schema_version {
            if version != 1 {
                return Err(invalid(format!(
                    "schema_version {version} is not supported (expected 1)"
                )));
            }
        }
        if self.related.limit == 0 {
            return Err(invalid("related.limit must be positive"));
        }
        if self.related.min_shared == 0 {
            return Err(invalid("related.min_shared must be positive"));
        }
        let bonus = self.related.cross_dimension_bonus;
        if !bonus.is_finite() || bonus < 0.0 {
            return Err(invalid(format!(
                "related.cross_dimension_bonus must be a non-negative number, got {bonus}"
            )));
        }
        if self.experts.limit == 0 || self.experts.plan_limit == 0 {
            return Err(invalid("experts.limit and experts.plan_limit must be positive"));
        }
        let matrix = &self.matrix;
        if matrix.min_bar_height == 0 {
            return Err(invalid("matrix.min_bar_height must be positive"));
        }
        if matrix.min_bar_height > matrix.max_bar_height {
            return Err(invalid(format!(
                "matrix.min_bar_height ({}) exceeds matrix.max_bar_height ({})",
                matrix.min_bar_height, matrix.max_bar_height
            )));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> SearchError {
    SearchError::InvalidProfile(message.into())
}

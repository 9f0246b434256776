use crate::error::KeyError;
use crate::types::{Dimension, Phase};
use policy_protocol::POLICY_KEY_SEPARATOR;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Composite identity of a policy: (dimension, phase, policy id).
///
/// Serialises as `Dimension|Phase|PolicyId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PolicyKey {
    pub dimension: Dimension,
    pub phase: Phase,
    pub policy_id: String,
}

impl PolicyKey {
    pub fn new(dimension: Dimension, phase: Phase, policy_id: impl Into<String>) -> Self {
        Self {
            dimension,
            phase,
            policy_id: policy_id.into(),
        }
    }

    pub fn in_cell(&self, dimension: Dimension, phase: Phase) -> bool {
        self.dimension == dimension && self.phase == phase
    }
}

impl fmt::Display for PolicyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            self.dimension.id(),
            self.phase.id(),
            self.policy_id,
            sep = POLICY_KEY_SEPARATOR
        )
    }
}

impl FromStr for PolicyKey {
    type Err = KeyError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut parts = raw.split(POLICY_KEY_SEPARATOR);
        let (Some(dimension), Some(phase), Some(policy_id), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(KeyError::Malformed(raw.to_string()));
        };
        if policy_id.trim().is_empty() {
            return Err(KeyError::EmptyPolicyId(raw.to_string()));
        }
        Ok(Self {
            dimension: dimension.parse()?,
            phase: phase.parse()?,
            policy_id: policy_id.to_string(),
        })
    }
}

impl TryFrom<String> for PolicyKey {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PolicyKey> for String {
    fn from(value: PolicyKey) -> Self {
        value.to_string()
    }
}

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub const CAPABILITIES_SCHEMA_VERSION: u32 = 1;

/// Separator used when a composite policy key travels as a string.
pub const POLICY_KEY_SEPARATOR: char = '|';

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidRequest,
    InvalidKey,
    UnknownPolicy,
    DataUnavailable,
    Internal,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidRequest => "invalid_request",
            ErrorCode::InvalidKey => "invalid_key",
            ErrorCode::UnknownPolicy => "unknown_policy",
            ErrorCode::DataUnavailable => "data_unavailable",
            ErrorCode::Internal => "internal",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ToolNextAction {
    pub tool: String,
    pub args: serde_json::Value,
    pub reason: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ErrorEnvelope {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next_actions: Vec<ToolNextAction>,
}

impl ErrorEnvelope {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            hint: None,
            next_actions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Availability of the three datasets after startup.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStatus {
    pub policies: bool,
    pub experts: bool,
    pub considerations: bool,
}

impl SourceStatus {
    pub fn all_loaded(&self) -> bool {
        self.policies && self.experts && self.considerations
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CapabilitiesServer {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DefaultLimits {
    pub related: usize,
    pub experts: usize,
    pub plan_experts: usize,
    pub debounce_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Capabilities {
    pub schema_version: u32,
    pub server: CapabilitiesServer,
    pub actions: Vec<String>,
    pub dimensions: Vec<String>,
    pub phases: Vec<String>,
    pub key_separator: String,
    pub default_limits: DefaultLimits,
    pub sources: SourceStatus,
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn error_envelope_skips_empty_fields() {
        let envelope = ErrorEnvelope::new(ErrorCode::UnknownPolicy, "no such policy");
        let raw = serialize_json(&envelope).unwrap();
        assert_eq!(raw, r#"{"code":"unknown_policy","message":"no such policy"}"#);
    }

    #[test]
    fn error_code_wire_names_match_as_str() {
        for code in [
            ErrorCode::InvalidRequest,
            ErrorCode::InvalidKey,
            ErrorCode::UnknownPolicy,
            ErrorCode::DataUnavailable,
            ErrorCode::Internal,
        ] {
            let raw = serde_json::to_value(code).unwrap();
            assert_eq!(raw, serde_json::Value::String(code.as_str().to_string()));
        }
    }

    #[test]
    fn source_status_requires_all_three() {
        let mut status = SourceStatus {
            policies: true,
            experts: true,
            considerations: false,
        };
        assert!(!status.all_loaded());
        status.considerations = true;
        assert!(status.all_loaded());
    }
}

use anyhow::{Context, Result};
use policy_catalog::{CatalogError, Dimension, KeyError, Phase, PolicyKey};
use policy_protocol::{ErrorCode, SourceStatus, ToolNextAction};
use policy_search::{FilterCriteria, SearchError};
use policy_state::SelectionSnapshot;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

pub const DEFAULT_LIST_LIMIT: usize = 50;
pub const DEFAULT_KEYWORD_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub action: CommandAction,
    #[serde(default = "empty_payload")]
    pub payload: Value,
}

fn empty_payload() -> Value {
    Value::Object(Default::default())
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandAction {
    Capabilities,
    Stats,
    Keywords,
    List,
    Filter,
    Related,
    Experts,
    PlanExperts,
    Considerations,
    Matrix,
    PlanReport,
    Suggestions,
}

impl CommandAction {
    pub const ALL: [CommandAction; 12] = [
        CommandAction::Capabilities,
        CommandAction::Stats,
        CommandAction::Keywords,
        CommandAction::List,
        CommandAction::Filter,
        CommandAction::Related,
        CommandAction::Experts,
        CommandAction::PlanExperts,
        CommandAction::Considerations,
        CommandAction::Matrix,
        CommandAction::PlanReport,
        CommandAction::Suggestions,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            CommandAction::Capabilities => "capabilities",
            CommandAction::Stats => "stats",
            CommandAction::Keywords => "keywords",
            CommandAction::List => "list",
            CommandAction::Filter => "filter",
            CommandAction::Related => "related",
            CommandAction::Experts => "experts",
            CommandAction::PlanExperts => "plan_experts",
            CommandAction::Considerations => "considerations",
            CommandAction::Matrix => "matrix",
            CommandAction::PlanReport => "plan_report",
            CommandAction::Suggestions => "suggestions",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub status: CommandStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<policy_protocol::ErrorEnvelope>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<Hint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next_actions: Vec<ToolNextAction>,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub meta: ResponseMeta,
}

impl CommandResponse {
    pub fn is_error(&self) -> bool {
        matches!(self.status, CommandStatus::Error)
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Ok,
    Error,
}

#[derive(Debug, Serialize, Clone)]
pub struct Hint {
    #[serde(rename = "type")]
    pub kind: HintKind,
    pub text: String,
}

impl Hint {
    pub fn new(kind: HintKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HintKind {
    Info,
    Action,
    Warn,
}

#[derive(Debug, Serialize, Default, Clone)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<SourceStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncated: Option<bool>,
}

pub struct CommandOutcome {
    pub data: Value,
    pub hints: Vec<Hint>,
    pub meta: ResponseMeta,
    pub next_actions: Vec<ToolNextAction>,
}

impl CommandOutcome {
    pub fn from_value<T: Serialize>(value: T) -> Result<Self> {
        Ok(Self {
            data: serde_json::to_value(value)?,
            hints: Vec::new(),
            meta: ResponseMeta::default(),
            next_actions: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_hint(mut self, hint: Hint) -> Self {
        self.hints.push(hint);
        self
    }
}

pub fn parse_payload<T: DeserializeOwned>(action: CommandAction, payload: Value) -> Result<T> {
    serde_json::from_value(payload)
        .with_context(|| format!("Invalid payload for action {}", action.as_str()))
}

pub fn parse_key(raw: &str) -> Result<PolicyKey> {
    raw.parse::<PolicyKey>()
        .with_context(|| format!("Invalid policy key '{raw}'"))
}

// Payloads

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct EmptyPayload {}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct KeywordsPayload {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Payloads that act on a selection carry an optional state snapshot.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct StatePayload {
    #[serde(default)]
    pub state: Option<SelectionSnapshot>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ListPayload {
    #[serde(default)]
    pub state: Option<SelectionSnapshot>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Filter inputs. The snapshot spellings (`selectedDimension`, `searchTerm`,
/// `activeKeywords`, ...) are accepted as aliases; any other key is rejected.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FilterPayload {
    #[serde(default, alias = "selectedDimension")]
    pub dimension: Option<Dimension>,
    #[serde(default, alias = "selectedPhase")]
    pub phase: Option<Phase>,
    #[serde(default, alias = "searchTerm")]
    pub search_term: String,
    #[serde(default, alias = "activeKeywords")]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl FilterPayload {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            dimension: self.dimension,
            phase: self.phase,
            search_term: self.search_term.clone(),
            keywords: self.keywords.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelatedPayload {
    pub key: String,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ExpertsPayload {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsiderationsPayload {
    pub dimension: String,
    pub phase: String,
}

#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Json,
    Markdown,
}

/// A plan given either as explicit keys or through a state snapshot.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct PlanPayload {
    #[serde(default)]
    pub plan: Option<Vec<String>>,
    #[serde(default)]
    pub state: Option<SelectionSnapshot>,
    #[serde(default)]
    pub format: ReportFormat,
}

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub code: ErrorCode,
    pub hint: Option<String>,
    pub hints: Vec<Hint>,
    pub next_actions: Vec<ToolNextAction>,
}

/// Maps an error chain to a wire code plus recovery hints.
pub fn classify_error(err: &anyhow::Error, action: Option<CommandAction>) -> ErrorClassification {
    let mut code = ErrorCode::Internal;
    let mut hint = None;
    let mut next_actions = Vec::new();

    for cause in err.chain() {
        if let Some(search) = cause.downcast_ref::<SearchError>() {
            if let SearchError::UnknownPolicy(key) = search {
                code = ErrorCode::UnknownPolicy;
                hint = Some(format!(
                    "No policy {key} in the catalog; list a cell to find valid ids."
                ));
                next_actions.push(ToolNextAction {
                    tool: CommandAction::List.as_str().to_string(),
                    args: json!({
                        "state": {
                            "selectedDimension": key.dimension,
                            "selectedPhase": key.phase,
                        }
                    }),
                    reason: "List the policies of the requested cell.".to_string(),
                });
            }
            break;
        }
        if let Some(key_err) = cause.downcast_ref::<KeyError>() {
            code = match key_err {
                KeyError::Malformed(_) | KeyError::EmptyPolicyId(_) => ErrorCode::InvalidKey,
                KeyError::UnknownDimension(_) | KeyError::UnknownPhase(_) => {
                    ErrorCode::InvalidRequest
                }
            };
            hint = Some(
                "Policy keys look like 'Enabling Infrastructure|Design|P1'; see capabilities for valid names."
                    .to_string(),
            );
            next_actions.push(ToolNextAction {
                tool: CommandAction::Capabilities.as_str().to_string(),
                args: json!({}),
                reason: "Discover dimension and phase names.".to_string(),
            });
            break;
        }
        if let Some(CatalogError::PolicyDataUnavailable(_)) = cause.downcast_ref::<CatalogError>() {
            code = ErrorCode::DataUnavailable;
            hint = Some(
                "Policy data could not be loaded; check --data-dir or --policies.".to_string(),
            );
            break;
        }
        if cause.downcast_ref::<serde_json::Error>().is_some() {
            code = ErrorCode::InvalidRequest;
            hint = Some(match action {
                Some(action) => format!(
                    "Check the payload fields for action {}.",
                    action.as_str()
                ),
                None => "Requests look like {\"action\": \"stats\", \"payload\": {}}.".to_string(),
            });
            break;
        }
    }

    let hints = hint
        .iter()
        .map(|text| Hint::new(HintKind::Action, text.clone()))
        .collect();
    ErrorClassification {
        code,
        hint,
        hints,
        next_actions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_names_round_trip_through_serde() {
        for action in CommandAction::ALL {
            let parsed: CommandAction =
                serde_json::from_value(Value::String(action.as_str().to_string())).unwrap();
            assert_eq!(parsed, action);
        }
    }

    #[test]
    fn classifies_unknown_policy() {
        let key = PolicyKey::new(Dimension::ResearchEducation, Phase::Design, "P404");
        let err = anyhow::Error::new(SearchError::UnknownPolicy(key)).context("related failed");
        let class = classify_error(&err, Some(CommandAction::Related));
        assert_eq!(class.code, ErrorCode::UnknownPolicy);
        assert_eq!(class.next_actions[0].tool, "list");
    }

    #[test]
    fn classifies_malformed_keys_and_payloads() {
        let err = parse_key("no separator").unwrap_err();
        assert_eq!(classify_error(&err, None).code, ErrorCode::InvalidKey);

        let err = parse_payload::<RelatedPayload>(CommandAction::Related, json!({})).unwrap_err();
        let class = classify_error(&err, Some(CommandAction::Related));
        assert_eq!(class.code, ErrorCode::InvalidRequest);
        assert!(class.hint.unwrap().contains("related"));
    }

    #[test]
    fn unknown_errors_are_internal() {
        let err = anyhow::anyhow!("boom");
        let class = classify_error(&err, None);
        assert_eq!(class.code, ErrorCode::Internal);
        assert!(class.hints.is_empty());
    }

    #[test]
    fn filter_payload_accepts_snapshot_spellings() {
        let payload: FilterPayload = parse_payload(
            CommandAction::Filter,
            json!({
                "selectedDimension": "Legislation & Policy",
                "searchTerm": "rights",
                "activeKeywords": ["privacy"],
            }),
        )
        .unwrap();
        let criteria = payload.criteria();
        assert_eq!(criteria.dimension, Some(Dimension::LegislationPolicy));
        assert_eq!(criteria.phase, None);
        assert_eq!(criteria.search_term, "rights");
        assert_eq!(criteria.keywords, vec!["privacy"]);
    }

    #[test]
    fn filter_payload_rejects_unknown_keys() {
        let err = parse_payload::<FilterPayload>(CommandAction::Filter, json!({ "term": "rights" }))
            .unwrap_err();
        assert_eq!(classify_error(&err, Some(CommandAction::Filter)).code, ErrorCode::InvalidRequest);
    }

    #[test]
    fn matrix_payload_has_no_limit() {
        assert!(parse_payload::<StatePayload>(CommandAction::Matrix, json!({ "limit": 3 })).is_err());
        let list: ListPayload =
            parse_payload(CommandAction::List, json!({ "limit": 3 })).unwrap();
        assert_eq!(list.limit, Some(3));
    }
}

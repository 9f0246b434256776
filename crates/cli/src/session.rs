//! Line-oriented interactive driver.
//!
//! Each stdin line is one JSON operation; each state event and each
//! requested view goes to stdout as one JSON line. Consecutive `search`
//! operations are debounced; any other operation first applies a pending
//! search so output stays in input order.

use crate::command::domain::parse_key;
use crate::command::error_response;
use anyhow::{Context, Result};
use policy_search::{related_keys, PolicyEngine};
use policy_state::{Debouncer, SelectionSnapshot, SelectionState, StateEvent};
use serde::Deserialize;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::time::Instant;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", deny_unknown_fields)]
pub enum SessionOp {
    SetDimension {
        dimension: String,
    },
    ClearDimension,
    SetPhase {
        phase: String,
    },
    ClearPhase,
    /// Either a bare id inside the selected cell or a full key anywhere.
    FocusPolicy {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        key: Option<String>,
    },
    ClearPolicy,
    AddToPlan {
        key: String,
    },
    RemoveFromPlan {
        key: String,
    },
    ClearPlan,
    Search {
        term: String,
    },
    AddKeyword {
        keyword: String,
    },
    RemoveKeyword {
        keyword: String,
    },
    ClearKeywords,
    ClearFilters,
    View {
        #[serde(default)]
        view: ViewKind,
    },
    Snapshot,
    Restore {
        state: SelectionSnapshot,
    },
    Reset,
}

#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    #[default]
    Listing,
    Matrix,
    Related,
    Experts,
    PlanExperts,
    Considerations,
    Suggestions,
    Report,
}

impl ViewKind {
    fn as_str(self) -> &'static str {
        match self {
            ViewKind::Listing => "listing",
            ViewKind::Matrix => "matrix",
            ViewKind::Related => "related",
            ViewKind::Experts => "experts",
            ViewKind::PlanExperts => "plan_experts",
            ViewKind::Considerations => "considerations",
            ViewKind::Suggestions => "suggestions",
            ViewKind::Report => "report",
        }
    }
}

pub struct Session {
    engine: PolicyEngine,
    state: SelectionState,
    events: Rc<RefCell<Vec<StateEvent>>>,
    search: Debouncer<String>,
}

impl Session {
    pub fn new(engine: PolicyEngine) -> Self {
        let debounce = engine.profile().search.debounce();
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut state = SelectionState::new();
        let sink = Rc::clone(&events);
        state.on_any(move |event| sink.borrow_mut().push(event.clone()));
        Self {
            engine,
            state,
            events,
            search: Debouncer::new(debounce),
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn search_deadline(&self) -> Option<Instant> {
        self.search.deadline()
    }

    /// Parses and applies one input line; malformed lines yield an error line.
    pub fn handle_line(&mut self, line: &str, now: Instant) -> Vec<Value> {
        let line = line.trim();
        if line.is_empty() {
            return Vec::new();
        }
        let result = serde_json::from_str::<SessionOp>(line)
            .context("Invalid session operation")
            .and_then(|op| self.apply(op, now));
        match result {
            Ok(lines) => lines,
            Err(err) => {
                let mut lines = self.drain_events();
                let response = error_response(&err, None, 0);
                lines.push(json!({ "error": response.error }));
                lines
            }
        }
    }

    pub fn apply(&mut self, op: SessionOp, now: Instant) -> Result<Vec<Value>> {
        if !matches!(op, SessionOp::Search { .. }) {
            self.flush_search();
        }

        let mut views = Vec::new();
        match op {
            SessionOp::SetDimension { dimension } => {
                self.engine.select_dimension(&mut self.state, &dimension);
            }
            SessionOp::ClearDimension => self.state.clear_dimension(),
            SessionOp::SetPhase { phase } => {
                self.engine.select_phase(&mut self.state, &phase);
            }
            SessionOp::ClearPhase => self.state.clear_phase(),
            SessionOp::FocusPolicy { id, key } => match (id, key) {
                (_, Some(key)) => {
                    let key = parse_key(&key)?;
                    self.engine.focus_key(&mut self.state, &key);
                }
                (Some(id), None) => {
                    self.engine.focus_policy(&mut self.state, &id);
                }
                (None, None) => anyhow::bail!("focus_policy needs `id` or `key`"),
            },
            SessionOp::ClearPolicy => self.state.clear_policy(),
            SessionOp::AddToPlan { key } => {
                let key = parse_key(&key)?;
                self.engine.add_to_plan(&mut self.state, key);
            }
            SessionOp::RemoveFromPlan { key } => {
                let key = parse_key(&key)?;
                self.state.remove_from_plan(&key);
            }
            SessionOp::ClearPlan => self.state.clear_plan(),
            SessionOp::AddKeyword { keyword } => {
                self.state.add_keyword(keyword);
            }
            SessionOp::RemoveKeyword { keyword } => {
                self.state.remove_keyword(&keyword);
            }
            SessionOp::ClearKeywords => self.state.clear_all_keywords(),
            SessionOp::ClearFilters => self.state.clear_all_filters(),
            SessionOp::View { view } => views.push(self.view(view)?),
            SessionOp::Snapshot => views.push(json!({ "snapshot": self.state.snapshot() })),
            SessionOp::Restore { state } => {
                self.state.restore(state);
                self.recompute_related();
            }
            SessionOp::Reset => self.state.reset(),
            SessionOp::Search { term } => self.search.push(term, now),
        }

        let mut lines = self.drain_events();
        lines.extend(views);
        Ok(lines)
    }

    /// Applies the pending search once its quiet window has passed.
    pub fn tick(&mut self, now: Instant) -> Vec<Value> {
        if let Some(term) = self.search.take_due(now) {
            self.state.set_search_term(term);
        }
        self.drain_events()
    }

    /// Applies any pending search immediately.
    pub fn finish(&mut self) -> Vec<Value> {
        self.flush_search();
        self.drain_events()
    }

    fn flush_search(&mut self) {
        if let Some(term) = self.search.flush() {
            self.state.set_search_term(term);
        }
    }

    fn recompute_related(&mut self) {
        let Some(key) = self.state.current_policy_key() else {
            return;
        };
        if let Ok(related) = self.engine.related(&key) {
            self.state.set_related_policies(related_keys(&related));
        }
    }

    fn drain_events(&mut self) -> Vec<Value> {
        self.events
            .borrow_mut()
            .drain(..)
            .filter_map(|event| serde_json::to_value(event).ok())
            .collect()
    }

    fn view(&self, view: ViewKind) -> Result<Value> {
        let engine = &self.engine;
        let state = &self.state;
        let data = match view {
            ViewKind::Listing => serde_json::to_value(engine.listing(state))?,
            ViewKind::Matrix => serde_json::to_value(engine.matrix(state))?,
            ViewKind::Related => {
                let related = match state.current_policy_key() {
                    Some(key) => engine.related(&key)?,
                    None => Vec::new(),
                };
                serde_json::to_value(related)?
            }
            ViewKind::Experts => {
                let keywords: Vec<String> = state
                    .current_policy_key()
                    .and_then(|key| engine.catalog().policy(&key))
                    .map(|entry| entry.record.keywords.clone())
                    .unwrap_or_default();
                serde_json::to_value(engine.experts_for(&keywords, None))?
            }
            ViewKind::PlanExperts => {
                serde_json::to_value(engine.plan_experts(state.selected_policies()))?
            }
            ViewKind::Considerations => match (state.selected_dimension(), state.selected_phase()) {
                (Some(dimension), Some(phase)) => {
                    serde_json::to_value(engine.considerations(dimension, phase))?
                }
                _ => Value::Null,
            },
            ViewKind::Suggestions => {
                serde_json::to_value(engine.suggestions(state.selected_policies()))?
            }
            ViewKind::Report => serde_json::to_value(engine.plan_report(state.selected_policies()))?,
        };
        Ok(json!({ "view": view.as_str(), "data": data }))
    }
}

/// Drives a session until `input` ends, writing JSON lines to `out`.
pub async fn run_session<R, W>(engine: PolicyEngine, input: R, mut out: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut session = Session::new(engine);
    let mut lines = input.lines();
    log::info!("Session started");

    loop {
        let deadline = session.search_deadline();
        let produced = tokio::select! {
            line = lines.next_line() => {
                match line.context("Failed to read session input")? {
                    Some(line) => session.handle_line(&line, Instant::now()),
                    None => break,
                }
            }
            _ = sleep_until(deadline), if deadline.is_some() => session.tick(Instant::now()),
        };
        write_lines(&mut out, &produced)?;
    }

    let produced = session.finish();
    write_lines(&mut out, &produced)?;
    log::info!("Session ended");
    Ok(())
}

async fn sleep_until(deadline: Option<Instant>) {
    if let Some(deadline) = deadline {
        tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
    }
}

fn write_lines<W: Write>(out: &mut W, lines: &[Value]) -> Result<()> {
    for line in lines {
        writeln!(out, "{}", serde_json::to_string(line)?)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use policy_catalog::{
        Catalog, Dimension, Phase, PolicyKey, PolicyRecord, PolicyTable, SpecialConsiderations,
    };
    use policy_search::EngineProfile;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn engine() -> PolicyEngine {
        let table: PolicyTable = vec![
            (
                PolicyKey::new(Dimension::EnablingInfrastructure, Phase::Design, "P1"),
                PolicyRecord::new("Data exchange", "").keywords(["privacy", "data"]),
            ),
            (
                PolicyKey::new(Dimension::LegislationPolicy, Phase::Design, "P2"),
                PolicyRecord::new("Privacy act", "").keywords(["privacy", "rights"]),
            ),
        ]
        .into_iter()
        .collect();
        PolicyEngine::new(
            Catalog::new(table, Vec::new(), SpecialConsiderations::default()),
            EngineProfile::default(),
        )
    }

    fn event_names(lines: &[Value]) -> Vec<String> {
        lines
            .iter()
            .filter_map(|line| line["event"].as_str().map(str::to_string))
            .collect()
    }

    #[test]
    fn searches_coalesce_until_the_window_passes() {
        let mut session = Session::new(engine());
        let start = Instant::now();
        assert!(session.handle_line(r#"{"op":"search","term":"p"}"#, start).is_empty());
        assert!(session
            .handle_line(r#"{"op":"search","term":"priv"}"#, start + Duration::from_millis(100))
            .is_empty());
        assert!(session.tick(start + Duration::from_millis(350)).is_empty());

        let lines = session.tick(start + Duration::from_millis(400));
        assert_eq!(event_names(&lines), vec!["searchChanged"]);
        assert_eq!(lines[0]["term"], "priv");
    }

    #[test]
    fn other_ops_apply_pending_search_first() {
        let mut session = Session::new(engine());
        let now = Instant::now();
        session.handle_line(r#"{"op":"search","term":"data"}"#, now);
        let lines = session.handle_line(r#"{"op":"view"}"#, now);

        assert_eq!(lines[0]["event"], "searchChanged");
        assert_eq!(lines[1]["view"], "listing");
        assert_eq!(lines[1]["data"]["mode"], "filtered");
        assert_eq!(lines[1]["data"]["policies"][0]["title"], "Data exchange");
    }

    #[test]
    fn focus_emits_related_and_matrix_shows_bars() {
        let mut session = Session::new(engine());
        let now = Instant::now();
        session.handle_line(r#"{"op":"set_dimension","dimension":"infrastructure"}"#, now);
        session.handle_line(r#"{"op":"set_phase","phase":"Design"}"#, now);
        let lines = session.handle_line(r#"{"op":"focus_policy","id":"P1"}"#, now);
        assert!(event_names(&lines).contains(&"relatedPoliciesChanged".to_string()));

        let lines = session.handle_line(r#"{"op":"view","view":"matrix"}"#, now);
        let cells = lines[0]["data"]["cells"].as_array().unwrap();
        let related_cell = &cells[4 + 1];
        assert_eq!(related_cell["bars"][0]["kind"], "related");
    }

    #[test]
    fn malformed_lines_report_errors_and_continue() {
        let mut session = Session::new(engine());
        let now = Instant::now();
        let lines = session.handle_line("{not json", now);
        assert_eq!(lines[0]["error"]["code"], "invalid_request");

        let lines = session.handle_line(r#"{"op":"add_to_plan","key":"nope"}"#, now);
        assert_eq!(lines[0]["error"]["code"], "invalid_key");

        let lines = session.handle_line(
            r#"{"op":"add_to_plan","key":"Legislation & Policy|Design|P2"}"#,
            now,
        );
        assert_eq!(event_names(&lines), vec!["policyAdded"]);
    }

    #[test]
    fn invalid_selection_is_silent() {
        let mut session = Session::new(engine());
        let lines =
            session.handle_line(r#"{"op":"set_dimension","dimension":"Astrology"}"#, Instant::now());
        assert!(lines.is_empty());
        assert_eq!(session.state().selected_dimension(), None);
    }

    #[tokio::test]
    async fn run_session_flushes_pending_search_at_end() {
        let input = b"{\"op\":\"search\",\"term\":\"rights\"}\n".as_slice();
        let mut out = Vec::new();
        run_session(engine(), input, &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(event_names(&lines), vec!["searchChanged"]);
    }
}

use crate::error::Result;
use crate::event::{EventBus, EventKind, StateEvent, SubscriptionId};
use policy_catalog::{Dimension, Phase, PolicyKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Plain structural copy of the selection state (keys as strings, sets as arrays).
///
/// Related policies are not included: they are derived data and must
/// be recomputed by the caller after a restore.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSnapshot {
    #[serde(default, alias = "selectedPolicyArea")]
    pub selected_dimension: Option<Dimension>,
    #[serde(default)]
    pub selected_phase: Option<Phase>,
    #[serde(default)]
    pub selected_policy: Option<String>,
    #[serde(default)]
    pub selected_policies: Vec<PolicyKey>,
    #[serde(default)]
    pub search_term: String,
    #[serde(default)]
    pub active_keywords: Vec<String>,
    #[serde(default)]
    pub is_loading: bool,
}

impl SelectionSnapshot {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Single source of truth for navigation, plan and filters in one session.
///
/// Every committed mutation is announced synchronously on the embedded
/// [`EventBus`]; redundant mutations emit nothing.
#[derive(Debug, Default)]
pub struct SelectionState {
    selected_dimension: Option<Dimension>,
    selected_phase: Option<Phase>,
    selected_policy: Option<String>,
    selected_policies: BTreeSet<PolicyKey>,
    related_policies: BTreeSet<PolicyKey>,
    search_term: String,
    active_keywords: BTreeSet<String>,
    is_loading: bool,
    bus: EventBus,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    // Subscriptions

    pub fn on(
        &mut self,
        kind: EventKind,
        listener: impl FnMut(&StateEvent) + 'static,
    ) -> SubscriptionId {
        self.bus.subscribe(kind, listener)
    }

    pub fn on_any(&mut self, listener: impl FnMut(&StateEvent) + 'static) -> SubscriptionId {
        self.bus.subscribe_all(listener)
    }

    pub fn off(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    fn emit(&mut self, event: StateEvent) {
        self.bus.emit(&event);
    }

    // Dimension

    pub fn set_dimension(&mut self, dimension: Dimension) {
        if self.selected_dimension == Some(dimension) {
            return;
        }
        self.selected_dimension = Some(dimension);
        self.selected_phase = None;
        self.selected_policy = None;
        self.related_policies.clear();
        self.emit(StateEvent::DimensionChanged { dimension });
    }

    pub fn clear_dimension(&mut self) {
        self.selected_dimension = None;
        self.selected_phase = None;
        self.selected_policy = None;
        self.related_policies.clear();
        self.emit(StateEvent::DimensionCleared);
    }

    // Phase

    pub fn set_phase(&mut self, phase: Phase) {
        if self.selected_phase == Some(phase) {
            return;
        }
        self.selected_phase = Some(phase);
        self.selected_policy = None;
        self.related_policies.clear();
        self.emit(StateEvent::PhaseChanged { phase });
    }

    pub fn clear_phase(&mut self) {
        self.selected_phase = None;
        self.selected_policy = None;
        self.related_policies.clear();
        self.emit(StateEvent::PhaseCleared);
    }

    // Focal policy

    /// Stores the focal policy id. Related policies are left untouched; the
    /// caller recomputes them and calls [`Self::set_related_policies`].
    pub fn set_policy(&mut self, policy_id: impl Into<String>) {
        let policy_id = policy_id.into();
        if self.selected_policy.as_deref() == Some(policy_id.as_str()) {
            return;
        }
        self.selected_policy = Some(policy_id.clone());
        self.emit(StateEvent::PolicyChanged { policy_id });
    }

    pub fn clear_policy(&mut self) {
        self.selected_policy = None;
        self.related_policies.clear();
        self.emit(StateEvent::PolicyCleared);
    }

    pub fn set_related_policies(&mut self, keys: impl IntoIterator<Item = PolicyKey>) {
        self.related_policies = keys.into_iter().collect();
        let keys = self.related_policies.iter().cloned().collect();
        self.emit(StateEvent::RelatedPoliciesChanged { keys });
    }

    // Plan

    pub fn add_to_plan(&mut self, key: PolicyKey) -> bool {
        if self.selected_policies.contains(&key) {
            return false;
        }
        self.selected_policies.insert(key.clone());
        self.emit(StateEvent::PolicyAdded { key });
        true
    }

    pub fn remove_from_plan(&mut self, key: &PolicyKey) -> bool {
        if !self.selected_policies.remove(key) {
            return false;
        }
        self.emit(StateEvent::PolicyRemoved { key: key.clone() });
        true
    }

    pub fn clear_plan(&mut self) {
        if self.selected_policies.is_empty() {
            return;
        }
        self.selected_policies.clear();
        self.emit(StateEvent::AllPoliciesCleared);
    }

    // Filters

    /// Stores the raw term; case folding happens only when matching.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        let term = term.into();
        if self.search_term == term {
            return;
        }
        self.search_term = term.clone();
        self.emit(StateEvent::SearchChanged { term });
    }

    pub fn add_keyword(&mut self, keyword: impl Into<String>) -> bool {
        let keyword = keyword.into();
        if self.active_keywords.contains(&keyword) {
            return false;
        }
        self.active_keywords.insert(keyword.clone());
        self.emit(StateEvent::KeywordAdded { keyword });
        true
    }

    pub fn remove_keyword(&mut self, keyword: &str) -> bool {
        if !self.active_keywords.remove(keyword) {
            return false;
        }
        self.emit(StateEvent::KeywordRemoved {
            keyword: keyword.to_string(),
        });
        true
    }

    pub fn clear_all_keywords(&mut self) {
        if self.active_keywords.is_empty() {
            return;
        }
        self.active_keywords.clear();
        self.emit(StateEvent::AllKeywordsCleared);
    }

    pub fn clear_all_filters(&mut self) {
        if !self.has_filters() {
            return;
        }
        self.search_term.clear();
        self.active_keywords.clear();
        self.emit(StateEvent::AllFiltersCleared);
    }

    pub fn set_loading(&mut self, is_loading: bool) {
        if self.is_loading == is_loading {
            return;
        }
        self.is_loading = is_loading;
        self.emit(StateEvent::LoadingChanged { is_loading });
    }

    /// Back to the initial values; subscriptions survive.
    pub fn reset(&mut self) {
        self.selected_dimension = None;
        self.selected_phase = None;
        self.selected_policy = None;
        self.selected_policies.clear();
        self.related_policies.clear();
        self.search_term.clear();
        self.active_keywords.clear();
        self.is_loading = false;
        self.emit(StateEvent::StateReset);
    }

    // Accessors

    pub fn selected_dimension(&self) -> Option<Dimension> {
        self.selected_dimension
    }

    pub fn selected_phase(&self) -> Option<Phase> {
        self.selected_phase
    }

    pub fn selected_policy(&self) -> Option<&str> {
        self.selected_policy.as_deref()
    }

    pub fn selected_policies(&self) -> &BTreeSet<PolicyKey> {
        &self.selected_policies
    }

    pub fn related_policies(&self) -> &BTreeSet<PolicyKey> {
        &self.related_policies
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn active_keywords(&self) -> &BTreeSet<String> {
        &self.active_keywords
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn has_selection(&self) -> bool {
        self.selected_dimension.is_some()
            || self.selected_phase.is_some()
            || self.selected_policy.is_some()
    }

    pub fn has_filters(&self) -> bool {
        !self.search_term.is_empty() || !self.active_keywords.is_empty()
    }

    pub fn can_show_policies(&self) -> bool {
        self.has_selection() || self.has_filters()
    }

    pub fn current_policy_key(&self) -> Option<PolicyKey> {
        match (
            self.selected_dimension,
            self.selected_phase,
            self.selected_policy.as_deref(),
        ) {
            (Some(dimension), Some(phase), Some(policy_id)) => {
                Some(PolicyKey::new(dimension, phase, policy_id))
            }
            _ => None,
        }
    }

    pub fn is_current_policy_selected(&self) -> bool {
        self.current_policy_key()
            .is_some_and(|key| self.selected_policies.contains(&key))
    }

    // Serialisation

    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            selected_dimension: self.selected_dimension,
            selected_phase: self.selected_phase,
            selected_policy: self.selected_policy.clone(),
            selected_policies: self.selected_policies.iter().cloned().collect(),
            search_term: self.search_term.clone(),
            active_keywords: self.active_keywords.iter().cloned().collect(),
            is_loading: self.is_loading,
        }
    }

    /// Replaces every field from `snapshot`. Related policies come back empty.
    pub fn restore(&mut self, snapshot: SelectionSnapshot) {
        self.selected_dimension = snapshot.selected_dimension;
        self.selected_phase = snapshot.selected_phase;
        self.selected_policy = snapshot.selected_policy.filter(|id| !id.is_empty());
        self.selected_policies = snapshot.selected_policies.into_iter().collect();
        self.related_policies.clear();
        self.search_term = snapshot.search_term;
        self.active_keywords = snapshot.active_keywords.into_iter().collect();
        self.is_loading = snapshot.is_loading;
        self.emit(StateEvent::StateRestored);
    }

    pub fn from_snapshot(snapshot: SelectionSnapshot) -> Self {
        let mut state = Self::new();
        state.restore(snapshot);
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording(state: &mut SelectionState) -> Rc<RefCell<Vec<EventKind>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        state.on_any(move |event| sink.borrow_mut().push(event.kind()));
        seen
    }

    fn key(id: &str) -> PolicyKey {
        PolicyKey::new(Dimension::EnablingInfrastructure, Phase::Design, id)
    }

    #[test]
    fn setting_dimension_resets_phase_policy_and_related() {
        let mut state = SelectionState::new();
        state.set_dimension(Dimension::EnablingInfrastructure);
        state.set_phase(Phase::Design);
        state.set_policy("P1");
        state.set_related_policies([key("P2")]);

        state.set_dimension(Dimension::LegislationPolicy);

        assert_eq!(state.selected_dimension(), Some(Dimension::LegislationPolicy));
        assert_eq!(state.selected_phase(), None);
        assert_eq!(state.selected_policy(), None);
        assert!(state.related_policies().is_empty());
    }

    #[test]
    fn repeated_setters_are_silent() {
        let mut state = SelectionState::new();
        let seen = recording(&mut state);
        state.set_dimension(Dimension::ResearchEducation);
        state.set_dimension(Dimension::ResearchEducation);
        state.set_phase(Phase::Analysis);
        state.set_phase(Phase::Analysis);
        state.set_policy("P3");
        state.set_policy("P3");
        state.set_search_term("Data");
        state.set_search_term("Data");
        state.set_loading(false);

        assert_eq!(
            *seen.borrow(),
            vec![
                EventKind::DimensionChanged,
                EventKind::PhaseChanged,
                EventKind::PolicyChanged,
                EventKind::SearchChanged,
            ]
        );
    }

    #[test]
    fn search_term_is_stored_raw() {
        let mut state = SelectionState::new();
        let seen = recording(&mut state);
        state.set_search_term("Data");
        state.set_search_term("data");
        assert_eq!(state.search_term(), "data");
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn phase_change_keeps_dimension_and_filters() {
        let mut state = SelectionState::new();
        state.set_dimension(Dimension::EconomyInnovation);
        state.set_search_term("tax");
        state.add_keyword("funding");
        state.set_phase(Phase::Implementation);
        state.set_policy("P9");
        state.set_phase(Phase::Design);

        assert_eq!(state.selected_dimension(), Some(Dimension::EconomyInnovation));
        assert_eq!(state.selected_policy(), None);
        assert_eq!(state.search_term(), "tax");
        assert!(state.active_keywords().contains("funding"));
    }

    #[test]
    fn set_policy_keeps_related_until_replaced() {
        let mut state = SelectionState::new();
        state.set_related_policies([key("P2")]);
        state.set_policy("P1");
        assert_eq!(state.related_policies().len(), 1);
        state.clear_policy();
        assert!(state.related_policies().is_empty());
    }

    #[test]
    fn plan_is_a_true_set() {
        let mut state = SelectionState::new();
        let seen = recording(&mut state);
        assert!(state.add_to_plan(key("P1")));
        assert!(!state.add_to_plan(key("P1")));
        assert!(!state.remove_from_plan(&key("P2")));
        assert!(state.remove_from_plan(&key("P1")));
        assert_eq!(
            *seen.borrow(),
            vec![EventKind::PolicyAdded, EventKind::PolicyRemoved]
        );
    }

    #[test]
    fn clearing_plan_emits_exactly_once() {
        let mut state = SelectionState::new();
        state.add_to_plan("Enabling Infrastructure|Design|P1".parse().unwrap());
        let seen = recording(&mut state);
        state.clear_plan();
        state.clear_plan();
        assert!(state.selected_policies().is_empty());
        assert_eq!(*seen.borrow(), vec![EventKind::AllPoliciesCleared]);
    }

    #[test]
    fn plan_survives_navigation() {
        let mut state = SelectionState::new();
        state.add_to_plan(key("P1"));
        state.set_dimension(Dimension::LegislationPolicy);
        state.clear_dimension();
        state.clear_phase();
        state.clear_policy();
        assert!(state.selected_policies().contains(&key("P1")));
    }

    #[test]
    fn clear_all_filters_is_one_observable_change() {
        let mut state = SelectionState::new();
        state.set_search_term("ai");
        state.add_keyword("ethics");
        state.add_keyword("privacy");
        let seen = recording(&mut state);
        state.clear_all_filters();
        assert_eq!(state.search_term(), "");
        assert!(state.active_keywords().is_empty());
        assert_eq!(*seen.borrow(), vec![EventKind::AllFiltersCleared]);
    }

    #[test]
    fn keyword_set_mutations_emit_on_change_only() {
        let mut state = SelectionState::new();
        let seen = recording(&mut state);
        assert!(state.add_keyword("privacy"));
        assert!(!state.add_keyword("privacy"));
        assert!(!state.remove_keyword("rights"));
        state.clear_all_keywords();
        state.clear_all_keywords();
        assert_eq!(
            *seen.borrow(),
            vec![EventKind::KeywordAdded, EventKind::AllKeywordsCleared]
        );
    }

    #[test]
    fn current_policy_key_requires_all_coordinates() {
        let mut state = SelectionState::new();
        state.set_phase(Phase::Design);
        state.set_policy("P1");
        assert_eq!(state.current_policy_key(), None);

        let mut state = SelectionState::new();
        state.set_dimension(Dimension::EnablingInfrastructure);
        state.set_phase(Phase::Design);
        state.set_policy("P1");
        assert_eq!(state.current_policy_key(), Some(key("P1")));
        assert!(!state.is_current_policy_selected());
        state.add_to_plan(key("P1"));
        assert!(state.is_current_policy_selected());
    }

    #[test]
    fn snapshot_restore_keeps_sets_and_drops_related() {
        let mut state = SelectionState::new();
        state.set_dimension(Dimension::EnablingInfrastructure);
        state.set_phase(Phase::Design);
        state.set_policy("P1");
        state.set_related_policies([key("P2")]);
        state.add_to_plan(key("P1"));
        state.add_to_plan(key("P3"));
        state.add_keyword("data");
        state.set_search_term("Grid");

        let raw = serde_json::to_string(&state.snapshot()).unwrap();
        let restored_snapshot = SelectionSnapshot::from_json_str(&raw).unwrap();

        let mut restored = SelectionState::new();
        let seen = recording(&mut restored);
        restored.restore(restored_snapshot);

        assert_eq!(restored.snapshot(), state.snapshot());
        assert!(restored.related_policies().is_empty());
        assert_eq!(*seen.borrow(), vec![EventKind::StateRestored]);
    }

    #[test]
    fn snapshot_uses_delimited_keys_and_accepts_legacy_field_name() {
        let snapshot = SelectionSnapshot::from_json_str(
            r#"{
                "selectedPolicyArea": "Legislation & Policy",
                "selectedPolicies": ["Enabling Infrastructure|Design|P1", "Enabling Infrastructure|Design|P1"],
                "activeKeywords": ["privacy"]
            }"#,
        )
        .unwrap();
        let state = SelectionState::from_snapshot(snapshot);
        assert_eq!(state.selected_dimension(), Some(Dimension::LegislationPolicy));
        assert_eq!(state.selected_policies().len(), 1);

        let value = serde_json::to_value(state.snapshot()).unwrap();
        assert_eq!(
            value["selectedPolicies"][0],
            "Enabling Infrastructure|Design|P1"
        );
    }

    #[test]
    fn malformed_snapshot_keys_are_rejected() {
        assert!(SelectionSnapshot::from_json_str(r#"{"selectedPolicies":["no-separator"]}"#).is_err());
    }
}

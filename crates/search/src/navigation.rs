//! Validated navigation over [`SelectionState`].
//!
//! Names or keys that do not resolve against the catalog are ignored: the
//! state is left untouched and `false` is returned.

use crate::engine::PolicyEngine;
use crate::related::{related_keys, related_policies};
use policy_catalog::{Dimension, Phase, PolicyKey};
use policy_state::SelectionState;

impl PolicyEngine {
    pub fn select_dimension(&self, state: &mut SelectionState, name: &str) -> bool {
        match name.parse::<Dimension>() {
            Ok(dimension) => {
                state.set_dimension(dimension);
                true
            }
            Err(err) => {
                log::debug!("ignoring dimension selection: {err}");
                false
            }
        }
    }

    pub fn select_phase(&self, state: &mut SelectionState, name: &str) -> bool {
        match name.parse::<Phase>() {
            Ok(phase) => {
                state.set_phase(phase);
                true
            }
            Err(err) => {
                log::debug!("ignoring phase selection: {err}");
                false
            }
        }
    }

    /// Focuses a policy of the selected cell and stores its relations.
    pub fn focus_policy(&self, state: &mut SelectionState, policy_id: &str) -> bool {
        let (Some(dimension), Some(phase)) = (state.selected_dimension(), state.selected_phase())
        else {
            log::debug!("ignoring focus on '{policy_id}': no cell selected");
            return false;
        };
        let key = PolicyKey::new(dimension, phase, policy_id);
        let Some(focal) = self.catalog().policy(&key) else {
            log::debug!("ignoring focus on unknown policy {key}");
            return false;
        };
        if state.selected_policy() == Some(policy_id) {
            return true;
        }

        state.set_loading(true);
        state.set_policy(policy_id);
        let related = related_policies(self.catalog(), focal, &self.profile().related);
        state.set_related_policies(related_keys(&related));
        state.set_loading(false);
        true
    }

    /// Jumps to another cell and focuses `key` there.
    pub fn focus_key(&self, state: &mut SelectionState, key: &PolicyKey) -> bool {
        if !self.catalog().contains(key) {
            log::debug!("ignoring jump to unknown policy {key}");
            return false;
        }
        state.set_dimension(key.dimension);
        state.set_phase(key.phase);
        self.focus_policy(state, &key.policy_id)
    }

    /// Adds a catalog policy to the plan; unknown keys are ignored.
    pub fn add_to_plan(&self, state: &mut SelectionState, key: PolicyKey) -> bool {
        if !self.catalog().contains(&key) {
            log::debug!("ignoring plan addition of unknown policy {key}");
            return false;
        }
        state.add_to_plan(key)
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::PolicyEngine;
    use crate::profile::EngineProfile;
    use policy_catalog::{
        Catalog, Dimension, Phase, PolicyKey, PolicyRecord, PolicyTable, SpecialConsiderations,
    };
    use policy_state::{EventKind, SelectionState};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn p1() -> PolicyKey {
        PolicyKey::new(Dimension::EnablingInfrastructure, Phase::Design, "P1")
    }

    fn p2() -> PolicyKey {
        PolicyKey::new(Dimension::LegislationPolicy, Phase::Design, "P2")
    }

    fn engine() -> PolicyEngine {
        let table: PolicyTable = vec![
            (p1(), PolicyRecord::new("Data exchange", "").keywords(["privacy", "data"])),
            (p2(), PolicyRecord::new("Privacy act", "").keywords(["privacy", "rights"])),
        ]
        .into_iter()
        .collect();
        PolicyEngine::new(
            Catalog::new(table, Vec::new(), SpecialConsiderations::default()),
            EngineProfile::default(),
        )
    }

    fn record_events(state: &mut SelectionState) -> Rc<RefCell<Vec<EventKind>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        state.on_any(move |event| sink.borrow_mut().push(event.kind()));
        seen
    }

    #[test]
    fn invalid_names_are_silent_no_ops() {
        let engine = engine();
        let mut state = SelectionState::new();
        let seen = record_events(&mut state);

        assert!(!engine.select_dimension(&mut state, "Astrology"));
        assert!(!engine.select_phase(&mut state, "Retirement"));
        assert!(!engine.focus_policy(&mut state, "P1"));
        assert!(!engine.add_to_plan(
            &mut state,
            PolicyKey::new(Dimension::ResearchEducation, Phase::Analysis, "P404")
        ));
        assert!(seen.borrow().is_empty());
        assert_eq!(state.selected_dimension(), None);
    }

    #[test]
    fn focus_recomputes_related_policies() {
        let engine = engine();
        let mut state = SelectionState::new();
        assert!(engine.select_dimension(&mut state, "infrastructure"));
        assert!(engine.select_phase(&mut state, "design"));
        let seen = record_events(&mut state);

        assert!(engine.focus_policy(&mut state, "P1"));
        assert_eq!(state.current_policy_key(), Some(p1()));
        assert_eq!(state.related_policies().iter().cloned().collect::<Vec<_>>(), vec![p2()]);
        assert_eq!(
            *seen.borrow(),
            vec![
                EventKind::LoadingChanged,
                EventKind::PolicyChanged,
                EventKind::RelatedPoliciesChanged,
                EventKind::LoadingChanged,
            ]
        );
        assert!(!state.is_loading());
    }

    #[test]
    fn focus_rejects_policy_outside_selected_cell() {
        let engine = engine();
        let mut state = SelectionState::new();
        engine.select_dimension(&mut state, "Enabling Infrastructure");
        engine.select_phase(&mut state, "Design");
        assert!(!engine.focus_policy(&mut state, "P2"));
        assert_eq!(state.selected_policy(), None);
    }

    #[test]
    fn focus_key_jumps_across_dimensions() {
        let engine = engine();
        let mut state = SelectionState::new();
        engine.select_dimension(&mut state, "infrastructure");
        engine.select_phase(&mut state, "design");
        engine.focus_policy(&mut state, "P1");

        assert!(engine.focus_key(&mut state, &p2()));
        assert_eq!(state.selected_dimension(), Some(Dimension::LegislationPolicy));
        assert_eq!(state.current_policy_key(), Some(p2()));
        assert!(state.related_policies().contains(&p1()));
    }

    #[test]
    fn plan_addition_is_a_set_operation() {
        let engine = engine();
        let mut state = SelectionState::new();
        assert!(engine.add_to_plan(&mut state, p1()));
        assert!(!engine.add_to_plan(&mut state, p1()));
        assert_eq!(state.selected_policies().len(), 1);
    }
}

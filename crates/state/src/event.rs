use policy_catalog::{Dimension, Phase, PolicyKey};
use serde::Serialize;
use std::fmt;

/// A committed change to the selection state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum StateEvent {
    DimensionChanged { dimension: Dimension },
    DimensionCleared,
    PhaseChanged { phase: Phase },
    PhaseCleared,
    PolicyChanged { policy_id: String },
    PolicyCleared,
    PolicyAdded { key: PolicyKey },
    PolicyRemoved { key: PolicyKey },
    AllPoliciesCleared,
    RelatedPoliciesChanged { keys: Vec<PolicyKey> },
    SearchChanged { term: String },
    KeywordAdded { keyword: String },
    KeywordRemoved { keyword: String },
    AllKeywordsCleared,
    AllFiltersCleared,
    LoadingChanged { is_loading: bool },
    StateRestored,
    StateReset,
}

/// Payload-free event name, used for subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    DimensionChanged,
    DimensionCleared,
    PhaseChanged,
    PhaseCleared,
    PolicyChanged,
    PolicyCleared,
    PolicyAdded,
    PolicyRemoved,
    AllPoliciesCleared,
    RelatedPoliciesChanged,
    SearchChanged,
    KeywordAdded,
    KeywordRemoved,
    AllKeywordsCleared,
    AllFiltersCleared,
    LoadingChanged,
    StateRestored,
    StateReset,
}

impl EventKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            EventKind::DimensionChanged => "dimensionChanged",
            EventKind::DimensionCleared => "dimensionCleared",
            EventKind::PhaseChanged => "phaseChanged",
            EventKind::PhaseCleared => "phaseCleared",
            EventKind::PolicyChanged => "policyChanged",
            EventKind::PolicyCleared => "policyCleared",
            EventKind::PolicyAdded => "policyAdded",
            EventKind::PolicyRemoved => "policyRemoved",
            EventKind::AllPoliciesCleared => "allPoliciesCleared",
            EventKind::RelatedPoliciesChanged => "relatedPoliciesChanged",
            EventKind::SearchChanged => "searchChanged",
            EventKind::KeywordAdded => "keywordAdded",
            EventKind::KeywordRemoved => "keywordRemoved",
            EventKind::AllKeywordsCleared => "allKeywordsCleared",
            EventKind::AllFiltersCleared => "allFiltersCleared",
            EventKind::LoadingChanged => "loadingChanged",
            EventKind::StateRestored => "stateRestored",
            EventKind::StateReset => "stateReset",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            StateEvent::DimensionChanged { .. } => EventKind::DimensionChanged,
            StateEvent::DimensionCleared => EventKind::DimensionCleared,
            StateEvent::PhaseChanged { .. } => EventKind::PhaseChanged,
            StateEvent::PhaseCleared => EventKind::PhaseCleared,
            StateEvent::PolicyChanged { .. } => EventKind::PolicyChanged,
            StateEvent::PolicyCleared => EventKind::PolicyCleared,
            StateEvent::PolicyAdded { .. } => EventKind::PolicyAdded,
            StateEvent::PolicyRemoved { .. } => EventKind::PolicyRemoved,
            StateEvent::AllPoliciesCleared => EventKind::AllPoliciesCleared,
            StateEvent::RelatedPoliciesChanged { .. } => EventKind::RelatedPoliciesChanged,
            StateEvent::SearchChanged { .. } => EventKind::SearchChanged,
            StateEvent::KeywordAdded { .. } => EventKind::KeywordAdded,
            StateEvent::KeywordRemoved { .. } => EventKind::KeywordRemoved,
            StateEvent::AllKeywordsCleared => EventKind::AllKeywordsCleared,
            StateEvent::AllFiltersCleared => EventKind::AllFiltersCleared,
            StateEvent::LoadingChanged { .. } => EventKind::LoadingChanged,
            StateEvent::StateRestored => EventKind::StateRestored,
            StateEvent::StateReset => EventKind::StateReset,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type Listener = Box<dyn FnMut(&StateEvent)>;

struct Subscription {
    id: SubscriptionId,
    kind: Option<EventKind>,
    listener: Listener,
}

/// Synchronous listener registry. Delivery follows subscription order.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscriptions: Vec<Subscription>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.subscriptions.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        kind: EventKind,
        listener: impl FnMut(&StateEvent) + 'static,
    ) -> SubscriptionId {
        self.register(Some(kind), Box::new(listener))
    }

    pub fn subscribe_all(&mut self, listener: impl FnMut(&StateEvent) + 'static) -> SubscriptionId {
        self.register(None, Box::new(listener))
    }

    fn register(&mut self, kind: Option<EventKind>, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription { id, kind, listener });
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn emit(&mut self, event: &StateEvent) {
        let kind = event.kind();
        log::trace!("state event {kind}");
        for subscription in &mut self.subscriptions {
            if subscription.kind.map_or(true, |k| k == kind) {
                (subscription.listener)(event);
            }
        }
    }
}

//! Session-scoped selection state for the policy explorer.
//!
//! [`SelectionState`] is an explicitly constructed context object: callers
//! own it and pass it by reference to the engine and to whatever renders it.
//! Observers subscribe to typed [`StateEvent`]s and are called synchronously,
//! in subscription order, after each committed mutation.

mod debounce;
mod error;
mod event;
mod selection;

pub use debounce::{Debouncer, DEFAULT_DEBOUNCE};
pub use error::{Result, StateError};
pub use event::{EventBus, EventKind, Listener, StateEvent, SubscriptionId};
pub use selection::{SelectionSnapshot, SelectionState};

//! Transition history tracking.
//!
//! The history is an append-only log of committed transitions, kept for
//! diagnostics and tests. It is never consulted to drive behavior.

use super::event::EventKind;
use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single committed transition.
///
/// Only the event kind is recorded. Payloads may carry credentials and are
/// deliberately left out of the log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TransitionRecord<S: State, E: EventKind> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// The event that triggered the transition
    pub event: E,
    /// Timestamp of the triggering event
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of committed transitions.
///
/// `record` returns a new history with the entry appended; existing
/// histories are never modified.
///
/// # Example
///
/// ```rust
/// use statewise::core::{EventKind, State, StateHistory, TransitionRecord};
/// use serde::{Deserialize, Serialize};
/// use chrono::Utc;
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Phase { One, Two }
///
/// impl State for Phase {
///     fn name(&self) -> &str {
///         match self {
///             Self::One => "one",
///             Self::Two => "two",
///         }
///     }
/// }
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Go { Go }
///
/// impl EventKind for Go {
///     fn name(&self) -> &str { "GO" }
/// }
///
/// let history = StateHistory::new().record(TransitionRecord {
///     from: Phase::One,
///     to: Phase::Two,
///     event: Go::Go,
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(history.len(), 1);
/// assert_eq!(history.get_path(), vec![&Phase::One, &Phase::Two]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State, E: EventKind> {
    transitions: Vec<TransitionRecord<S, E>>,
}

impl<S: State, E: EventKind> Default for StateHistory<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, E: EventKind> StateHistory<S, E> {
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    pub fn record(&self, transition: TransitionRecord<S, E>) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// Append in place. Used by the machine, which owns its history.
    pub(crate) fn push(&mut self, transition: TransitionRecord<S, E>) {
        self.transitions.push(transition);
    }

    /// States traversed, in order: the first `from`, then every `to`.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Event kinds that drove the recorded transitions, in order.
    pub fn events(&self) -> Vec<&E> {
        self.transitions.iter().map(|t| &t.event).collect()
    }

    /// Time between the first and last recorded transitions.
    ///
    /// `None` for an empty history, or when timestamps run backwards.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.transitions.first()?, self.transitions.last()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn last(&self) -> Option<&TransitionRecord<S, E>> {
        self.transitions.last()
    }

    pub fn transitions(&self) -> &[TransitionRecord<S, E>] {
        &self.transitions
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}

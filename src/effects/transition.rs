//! Transition table entries and the errors a transition can produce.

use crate::core::{Context, Event, EventKind, Guard, State};
use futures::future::BoxFuture;
use std::sync::Arc;
use thiserror::Error;

/// Error raised by an action. The transition is rolled back when it occurs.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct ActionError {
    message: String,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Reasons a `transition` call leaves the machine untouched.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransitionError {
    #[error("no transition from '{from}' on '{event}'")]
    NoTransition { from: String, event: String },

    #[error("guard blocked transition from '{from}' on '{event}'")]
    GuardBlocked { from: String, event: String },

    #[error("ambiguous transition from '{from}' on '{event}': {matches} entries passed their guards")]
    Ambiguous {
        from: String,
        event: String,
        matches: usize,
    },

    #[error("transition action failed: {0}")]
    ActionFailed(#[from] ActionError),
}

/// Failure of a side effect that ran after its transition committed.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EffectError {
    #[error("effect failed: {0}")]
    Failed(String),

    #[error("no async runtime available to run the effect")]
    NoRuntime,

    #[error("effect task aborted: {0}")]
    Aborted(String),
}

impl EffectError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Action producing a context patch from the current context and event.
pub type ActionFn<C, E> =
    Arc<dyn Fn(&C, &Event<E>) -> Result<<C as Context>::Patch, ActionError> + Send + Sync>;

/// Asynchronous side effect run with the committed context.
pub type EffectFn<C, E> =
    Arc<dyn Fn(C, Event<E>) -> BoxFuture<'static, Result<(), EffectError>> + Send + Sync>;

/// One row of a transition table.
///
/// An entry matches when the machine is in `from` and receives an event of
/// kind `on`. The optional guard decides whether it may fire, the optional
/// action computes the context patch, and the optional effect runs after
/// the new state is committed.
pub struct Transition<S: State, E: EventKind, C: Context> {
    pub from: S,
    pub to: S,
    pub on: E,
    pub guard: Option<Guard<C, E>>,
    pub action: Option<ActionFn<C, E>>,
    pub effect: Option<EffectFn<C, E>>,
}

impl<S: State, E: EventKind, C: Context> Transition<S, E, C> {
    /// Whether this entry is keyed by `(state, kind)`.
    pub fn matches(&self, state: &S, kind: &E) -> bool {
        self.from == *state && self.on == *kind
    }

    /// Evaluate the guard; an absent guard always allows.
    pub fn allows(&self, context: &C, event: &Event<E>) -> bool {
        self.guard.as_ref().map_or(true, |g| g.check(context, event))
    }

    /// Compute the next context without touching the current one.
    pub fn apply(&self, context: &C, event: &Event<E>) -> Result<C, ActionError> {
        match &self.action {
            Some(action) => Ok(context.merge(action(context, event)?)),
            None => Ok(context.clone()),
        }
    }

    pub fn has_guard(&self) -> bool {
        self.guard.is_some()
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    pub fn has_effect(&self) -> bool {
        self.effect.is_some()
    }
}

impl<S: State, E: EventKind, C: Context> Clone for Transition<S, E, C> {
    fn clone(&self) -> Self {
        Self {
            from: self.from.clone(),
            to: self.to.clone(),
            on: self.on.clone(),
            guard: self.guard.clone(),
            action: self.action.clone(),
            effect: self.effect.clone(),
        }
    }
}

impl<S: State, E: EventKind, C: Context> std::fmt::Debug for Transition<S, E, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transition")
            .field("from", &self.from.name())
            .field("to", &self.to.name())
            .field("on", &self.on.name())
            .field("guard", &self.has_guard())
            .field("action", &self.has_action())
            .field("effect", &self.has_effect())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum Phase {
        Idle,
        Running,
    }

    impl State for Phase {
        fn name(&self) -> &str {
            match self {
                Self::Idle => "idle",
                Self::Running => "running",
            }
        }
    }

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum Signal {
        Start,
        Stop,
    }

    impl EventKind for Signal {
        fn name(&self) -> &str {
            match self {
                Self::Start => "START",
                Self::Stop => "STOP",
            }
        }
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Runs {
        count: u32,
    }

    impl Context for Runs {
        type Patch = u32;

        fn merge(&self, patch: u32) -> Self {
            Runs { count: patch }
        }
    }

    fn start() -> Transition<Phase, Signal, Runs> {
        Transition {
            from: Phase::Idle,
            to: Phase::Running,
            on: Signal::Start,
            guard: None,
            action: None,
            effect: None,
        }
    }

    #[test]
    fn matches_on_state_and_event() {
        let t = start();
        assert!(t.matches(&Phase::Idle, &Signal::Start));
        assert!(!t.matches(&Phase::Running, &Signal::Start));
        assert!(!t.matches(&Phase::Idle, &Signal::Stop));
    }

    #[test]
    fn absent_guard_allows() {
        let t = start();
        assert!(t.allows(&Runs { count: 0 }, &Event::now(Signal::Start)));
    }

    #[test]
    fn guard_is_respected() {
        let t = Transition {
            guard: Some(Guard::new(|r: &Runs, _: &Event<Signal>| r.count < 3)),
            ..start()
        };

        assert!(t.allows(&Runs { count: 2 }, &Event::new(Signal::Start, Utc::now())));
        assert!(!t.allows(&Runs { count: 3 }, &Event::new(Signal::Start, Utc::now())));
    }

    #[test]
    fn apply_merges_patch_into_copy() {
        let t = Transition {
            action: Some(Arc::new(
                |r: &Runs, _: &Event<Signal>| -> Result<u32, ActionError> { Ok(r.count + 1) },
            )),
            ..start()
        };
        let ctx = Runs { count: 1 };

        let next = t.apply(&ctx, &Event::now(Signal::Start)).unwrap();

        assert_eq!(next.count, 2);
        assert_eq!(ctx.count, 1);
    }

    #[test]
    fn apply_surfaces_action_errors() {
        let t = Transition {
            action: Some(Arc::new(
                |_: &Runs, _: &Event<Signal>| -> Result<u32, ActionError> {
                    Err(ActionError::new("no capacity"))
                },
            )),
            ..start()
        };

        let err = t.apply(&Runs { count: 0 }, &Event::now(Signal::Start)).unwrap_err();
        assert_eq!(err.message(), "no capacity");
    }

    #[test]
    fn transition_error_messages_name_the_rejection() {
        let err = TransitionError::NoTransition {
            from: "idle".into(),
            event: "STOP".into(),
        };
        assert!(err.to_string().starts_with("no transition"));

        let err = TransitionError::GuardBlocked {
            from: "idle".into(),
            event: "START".into(),
        };
        assert!(err.to_string().starts_with("guard blocked"));
    }
}

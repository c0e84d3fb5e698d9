//! State machine that interprets a transition table.

use crate::builder::{ConfigError, TransitionTable};
use crate::core::{Context, Event, EventKind, Payload, State, StateHistory, TransitionRecord};
use crate::effects::handle::{EffectFailure, EffectHandle, EffectObserver};
use crate::effects::transition::{EffectError, EffectFn, Transition, TransitionError};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// How the engine treats several entries that match and pass their guards
/// for the same event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AmbiguityPolicy {
    /// Take the first passing entry in table order.
    FirstMatch,

    /// Take the first passing entry and log a warning.
    #[default]
    Warn,

    /// Refuse the event with `TransitionError::Ambiguous`.
    Reject,
}

/// Result of a single `transition` call.
///
/// On success the new state has already been committed and recorded; an
/// attached effect may still be running.
#[derive(Debug)]
#[must_use]
pub struct TransitionOutcome<S: State> {
    from: S,
    result: Result<S, TransitionError>,
    effect: Option<EffectHandle>,
}

impl<S: State> TransitionOutcome<S> {
    fn rejected(from: S, error: TransitionError) -> Self {
        Self {
            from,
            result: Err(error),
            effect: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn from_state(&self) -> &S {
        &self.from
    }

    pub fn to_state(&self) -> Option<&S> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&TransitionError> {
        self.result.as_ref().err()
    }

    pub fn has_effect(&self) -> bool {
        self.effect.is_some()
    }

    /// Take the effect handle, leaving the outcome without one.
    pub fn take_effect(&mut self) -> Option<EffectHandle> {
        self.effect.take()
    }

    pub fn into_result(self) -> Result<S, TransitionError> {
        self.result
    }

    /// Wait for the attached effect, if any. Returns `Ok` when there is none.
    pub async fn settle(self) -> Result<(), EffectError> {
        match self.effect {
            Some(handle) => handle.wait().await,
            None => Ok(()),
        }
    }
}

/// Interpreter for a transition table.
///
/// A machine owns exactly one current `(state, context)` pair and its
/// history. All mutation goes through `transition` or `reset`, both of which
/// take `&mut self`; hosts that share a machine across threads must put it
/// behind a lock or confine it to one task.
pub struct StateMachine<S: State, E: EventKind, C: Context> {
    table: Arc<TransitionTable<S, E, C>>,
    initial_state: S,
    initial_context: C,
    current: S,
    context: C,
    history: StateHistory<S, E>,
    ambiguity: AmbiguityPolicy,
    effect_observer: Option<EffectObserver<S, E>>,
}

impl<S: State, E: EventKind, C: Context> StateMachine<S, E, C> {
    /// Create a machine in `initial` with `context`.
    pub fn new(
        table: TransitionTable<S, E, C>,
        initial: S,
        context: C,
    ) -> Result<Self, ConfigError> {
        Self::with_shared_table(Arc::new(table), initial, context)
    }

    /// Create a machine over a table shared with other machines.
    pub fn with_shared_table(
        table: Arc<TransitionTable<S, E, C>>,
        initial: S,
        context: C,
    ) -> Result<Self, ConfigError> {
        if !table.is_declared(&initial) {
            return Err(ConfigError::UnknownInitialState {
                state: initial.name().to_string(),
            });
        }

        Ok(Self {
            table,
            current: initial.clone(),
            context: context.clone(),
            initial_state: initial,
            initial_context: context,
            history: StateHistory::new(),
            ambiguity: AmbiguityPolicy::default(),
            effect_observer: None,
        })
    }

    pub fn with_ambiguity_policy(mut self, policy: AmbiguityPolicy) -> Self {
        self.ambiguity = policy;
        self
    }

    /// Register a sink for effect failures, in addition to the log.
    pub fn with_effect_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&EffectFailure<S, E>) + Send + Sync + 'static,
    {
        self.effect_observer = Some(Arc::new(observer));
        self
    }

    pub fn current_state(&self) -> &S {
        &self.current
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn history(&self) -> &StateHistory<S, E> {
        &self.history
    }

    pub fn table(&self) -> &TransitionTable<S, E, C> {
        &self.table
    }

    pub fn shared_table(&self) -> Arc<TransitionTable<S, E, C>> {
        Arc::clone(&self.table)
    }

    pub fn initial_state(&self) -> &S {
        &self.initial_state
    }

    /// Whether the current state is declared final.
    pub fn is_final(&self) -> bool {
        self.table
            .state_def(&self.current)
            .map_or_else(|| self.current.is_final(), |def| def.is_final)
    }

    /// Whether `event` would be accepted right now. Never mutates.
    pub fn can_transition(&self, event: &Event<E>) -> bool {
        self.select(event).is_ok()
    }

    /// Entries leaving the current state, regardless of their guards.
    pub fn possible_transitions(&self) -> Vec<&Transition<S, E, C>> {
        self.table.transitions_from(&self.current).collect()
    }

    /// Find the entry that would fire for `event`.
    fn select(&self, event: &Event<E>) -> Result<usize, TransitionError> {
        let mut candidates = self
            .table
            .candidates(&self.current, &event.kind)
            .peekable();

        if candidates.peek().is_none() {
            return Err(TransitionError::NoTransition {
                from: self.current.name().to_string(),
                event: event.name().to_string(),
            });
        }

        let mut passing = candidates.filter(|(_, t)| t.allows(&self.context, event));
        let Some((index, _)) = passing.next() else {
            return Err(TransitionError::GuardBlocked {
                from: self.current.name().to_string(),
                event: event.name().to_string(),
            });
        };

        if self.ambiguity == AmbiguityPolicy::FirstMatch {
            return Ok(index);
        }

        let matches = 1 + passing.count();
        if matches > 1 {
            match self.ambiguity {
                AmbiguityPolicy::Reject => {
                    return Err(TransitionError::Ambiguous {
                        from: self.current.name().to_string(),
                        event: event.name().to_string(),
                        matches,
                    });
                }
                _ => tracing::warn!(
                    from = self.current.name(),
                    event = event.name(),
                    matches,
                    "ambiguous transition, taking first table entry"
                ),
            }
        }

        Ok(index)
    }

    /// Apply `event`.
    ///
    /// Lookup, guard, action, commit and history append happen as one unit:
    /// on any rejection the state, context and history are exactly as they
    /// were. The effect, if any, is launched only after the commit and never
    /// rolls it back.
    pub fn transition(&mut self, event: Event<E>) -> TransitionOutcome<S> {
        let from = self.current.clone();

        let index = match self.select(&event) {
            Ok(index) => index,
            Err(error) => {
                tracing::trace!(from = from.name(), event = event.name(), %error, "transition rejected");
                return TransitionOutcome::rejected(from, error);
            }
        };

        let table = Arc::clone(&self.table);
        let transition = &table.transitions()[index];

        let next_context = match transition.apply(&self.context, &event) {
            Ok(context) => context,
            Err(error) => {
                tracing::debug!(from = from.name(), event = event.name(), %error, "action failed, transition rolled back");
                return TransitionOutcome::rejected(from, error.into());
            }
        };

        debug_assert!(table.is_declared(&transition.to));
        let to = transition.to.clone();
        self.current = to.clone();
        self.context = next_context;
        self.history.push(TransitionRecord {
            from: from.clone(),
            to: to.clone(),
            event: event.kind.clone(),
            timestamp: event.timestamp,
        });

        tracing::debug!(
            from = from.name(),
            to = to.name(),
            event = event.name(),
            "transition committed"
        );

        let effect = transition
            .effect
            .as_ref()
            .map(|effect| self.launch_effect(effect, event, &from, &to));

        TransitionOutcome {
            from,
            result: Ok(to),
            effect,
        }
    }

    /// Build and apply an event in one call.
    pub fn dispatch(
        &mut self,
        kind: E,
        payload: Payload,
        timestamp: DateTime<Utc>,
    ) -> TransitionOutcome<S> {
        self.transition(Event {
            kind,
            payload,
            timestamp,
        })
    }

    fn launch_effect(
        &self,
        effect: &EffectFn<C, E>,
        event: Event<E>,
        from: &S,
        to: &S,
    ) -> EffectHandle {
        let failure = |error: EffectError| EffectFailure {
            from: from.clone(),
            to: to.clone(),
            event: event.kind.clone(),
            error,
        };
        let template = failure(EffectError::NoRuntime);
        let observer = self.effect_observer.clone();

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let future = effect(self.context.clone(), event);
                EffectHandle::spawned(runtime.spawn(async move {
                    let result = future.await;
                    if let Err(error) = &result {
                        report(
                            observer.as_ref(),
                            &EffectFailure {
                                error: error.clone(),
                                ..template
                            },
                        );
                    }
                    result
                }))
            }
            Err(_) => {
                report(observer.as_ref(), &template);
                EffectHandle::rejected(EffectError::NoRuntime)
            }
        }
    }

    /// Restore the initial state and context and clear the history.
    pub fn reset(&mut self) {
        self.current = self.initial_state.clone();
        self.context = self.initial_context.clone();
        self.history = StateHistory::new();
        tracing::debug!(state = self.current.name(), "machine reset");
    }

    /// Reset, then apply `events` in order.
    pub fn replay<I>(&mut self, events: I) -> Vec<TransitionOutcome<S>>
    where
        I: IntoIterator<Item = Event<E>>,
    {
        self.reset();
        events
            .into_iter()
            .map(|event| self.transition(event))
            .collect()
    }
}

fn report<S: State, E: EventKind>(
    observer: Option<&EffectObserver<S, E>>,
    failure: &EffectFailure<S, E>,
) {
    tracing::warn!(
        from = failure.from.name(),
        to = failure.to.name(),
        event = failure.event.name(),
        error = %failure.error,
        "effect failed after commit"
    );
    if let Some(observer) = observer {
        observer(failure);
    }
}

impl<S: State, E: EventKind, C: Context> std::fmt::Debug for StateMachine<S, E, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current)
            .field("context", &self.context)
            .field("history", &self.history.len())
            .field("ambiguity", &self.ambiguity)
            .finish()
    }
}

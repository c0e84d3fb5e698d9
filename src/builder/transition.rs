//! Builder for constructing table entries.

use crate::builder::error::BuildError;
use crate::core::{Context, Event, EventKind, Guard, State};
use crate::effects::{ActionError, ActionFn, EffectError, EffectFn, Transition};
use futures::FutureExt;
use std::future::Future;
use std::sync::Arc;

/// Builder for constructing transitions with a fluent API.
pub struct TransitionBuilder<S: State, E: EventKind, C: Context> {
    from: Option<S>,
    to: Option<S>,
    on: Option<E>,
    guard: Option<Guard<C, E>>,
    action: Option<ActionFn<C, E>>,
    effect: Option<EffectFn<C, E>>,
}

impl<S: State, E: EventKind, C: Context> TransitionBuilder<S, E, C> {
    pub fn new() -> Self {
        Self {
            from: None,
            to: None,
            on: None,
            guard: None,
            action: None,
            effect: None,
        }
    }

    /// Set the source state (required).
    pub fn from(mut self, state: S) -> Self {
        self.from = Some(state);
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, state: S) -> Self {
        self.to = Some(state);
        self
    }

    /// Set the triggering event kind (required).
    pub fn on(mut self, event: E) -> Self {
        self.on = Some(event);
        self
    }

    /// Add a guard. Repeated guards must all pass.
    pub fn guard(mut self, guard: Guard<C, E>) -> Self {
        self.guard = Some(match self.guard.take() {
            Some(existing) => existing.and(guard),
            None => guard,
        });
        self
    }

    /// Add a guard using a closure.
    pub fn when<F>(self, predicate: F) -> Self
    where
        F: Fn(&C, &Event<E>) -> bool + Send + Sync + 'static,
    {
        self.guard(Guard::new(predicate))
    }

    /// Set a fallible action. An `Err` rolls the whole transition back.
    pub fn action<F>(mut self, action: F) -> Self
    where
        F: Fn(&C, &Event<E>) -> Result<C::Patch, ActionError> + Send + Sync + 'static,
    {
        self.action = Some(Arc::new(action));
        self
    }

    /// Set an infallible action.
    pub fn patch<F>(self, patch: F) -> Self
    where
        F: Fn(&C, &Event<E>) -> C::Patch + Send + Sync + 'static,
    {
        self.action(move |ctx: &C, event: &Event<E>| Ok(patch(ctx, event)))
    }

    /// Set the side effect run after the transition commits.
    pub fn effect<F, Fut>(mut self, effect: F) -> Self
    where
        F: Fn(C, Event<E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), EffectError>> + Send + 'static,
    {
        self.effect = Some(Arc::new(move |ctx: C, event: Event<E>| {
            effect(ctx, event).boxed()
        }));
        self
    }

    /// Build the transition.
    pub fn build(self) -> Result<Transition<S, E, C>, BuildError> {
        let from = self.from.ok_or(BuildError::MissingFromState)?;
        let to = self.to.ok_or(BuildError::MissingToState)?;
        let on = self.on.ok_or(BuildError::MissingEvent)?;

        Ok(Transition {
            from,
            to,
            on,
            guard: self.guard,
            action: self.action,
            effect: self.effect,
        })
    }
}

impl<S: State, E: EventKind, C: Context> Default for TransitionBuilder<S, E, C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    crate::state_enum! {
        enum Job {
            Queued => "queued",
            Running => "running",
            Done => "done",
        }
        final: [Done]
    }

    crate::event_enum! {
        enum JobEvent {
            Start => "START",
            Finish => "FINISH",
        }
    }

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Slots {
        free: u32,
    }

    impl Context for Slots {
        type Patch = u32;

        fn merge(&self, patch: u32) -> Self {
            Slots { free: patch }
        }
    }

    #[test]
    fn builder_validates_required_fields() {
        let missing_to = TransitionBuilder::<Job, JobEvent, Slots>::new()
            .from(Job::Queued)
            .build();
        assert!(matches!(missing_to, Err(BuildError::MissingToState)));

        let missing_event = TransitionBuilder::<Job, JobEvent, Slots>::new()
            .from(Job::Queued)
            .to(Job::Running)
            .build();
        assert!(matches!(missing_event, Err(BuildError::MissingEvent)));

        let missing_from = TransitionBuilder::<Job, JobEvent, Slots>::new()
            .to(Job::Running)
            .on(JobEvent::Start)
            .build();
        assert!(matches!(missing_from, Err(BuildError::MissingFromState)));
    }

    #[test]
    fn repeated_guards_all_apply() {
        let transition = TransitionBuilder::new()
            .from(Job::Queued)
            .to(Job::Running)
            .on(JobEvent::Start)
            .when(|s: &Slots, _: &Event<JobEvent>| s.free > 0)
            .when(|s: &Slots, _: &Event<JobEvent>| s.free < 8)
            .build()
            .unwrap();

        let event = Event::new(JobEvent::Start, Utc::now());
        assert!(transition.allows(&Slots { free: 4 }, &event));
        assert!(!transition.allows(&Slots { free: 0 }, &event));
        assert!(!transition.allows(&Slots { free: 9 }, &event));
    }

    #[test]
    fn patch_builds_infallible_action() {
        let transition = TransitionBuilder::new()
            .from(Job::Queued)
            .to(Job::Running)
            .on(JobEvent::Start)
            .patch(|s: &Slots, _: &Event<JobEvent>| s.free - 1)
            .build()
            .unwrap();

        let next = transition
            .apply(&Slots { free: 3 }, &Event::now(JobEvent::Start))
            .unwrap();
        assert_eq!(next.free, 2);
    }

    #[tokio::test]
    async fn effect_receives_committed_context() {
        let transition = TransitionBuilder::new()
            .from(Job::Running)
            .to(Job::Done)
            .on(JobEvent::Finish)
            .effect(|s: Slots, _: Event<JobEvent>| async move {
                if s.free == 0 {
                    Err(EffectError::failed("no slots"))
                } else {
                    Ok(())
                }
            })
            .build()
            .unwrap();

        let effect = transition.effect.clone().unwrap();
        assert!(effect(Slots { free: 1 }, Event::now(JobEvent::Finish))
            .await
            .is_ok());
        assert!(effect(Slots { free: 0 }, Event::now(JobEvent::Finish))
            .await
            .is_err());
    }
}

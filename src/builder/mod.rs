//! Builder API for declaring transition tables.
//!
//! Tables are data: states are declared up front, and every transition is a
//! value holding its guard, action and effect closures. Validation happens
//! once, when the table is built.

pub mod error;
pub mod macros;
pub mod table;
pub mod transition;
mod validate;

pub use error::{BuildError, ConfigError, TableIssue};
pub use table::{StateDef, TableBuilder, TransitionTable};
pub use transition::TransitionBuilder;

use crate::core::{Context, Event, EventKind, Guard, State};
use crate::effects::Transition;

/// Create an unconditional transition with no action or effect.
///
/// # Example
///
/// ```
/// use statewise::builder::simple_transition;
/// use statewise::{event_enum, state_enum};
///
/// state_enum! {
///     enum Lamp {
///         Off,
///         On,
///     }
/// }
///
/// event_enum! {
///     enum Switch {
///         Flip,
///     }
/// }
///
/// let transition = simple_transition::<Lamp, Switch, ()>(Lamp::Off, Switch::Flip, Lamp::On);
/// assert_eq!(transition.to, Lamp::On);
/// ```
pub fn simple_transition<S, E, C>(from: S, on: E, to: S) -> Transition<S, E, C>
where
    S: State,
    E: EventKind,
    C: Context,
{
    Transition {
        from,
        to,
        on,
        guard: None,
        action: None,
        effect: None,
    }
}

/// Create a transition gated by a guard predicate.
pub fn guarded_transition<S, E, C, F>(from: S, on: E, to: S, guard: F) -> Transition<S, E, C>
where
    S: State,
    E: EventKind,
    C: Context,
    F: Fn(&C, &Event<E>) -> bool + Send + Sync + 'static,
{
    Transition {
        guard: Some(Guard::new(guard)),
        ..simple_transition(from, on, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::state_enum! {
        enum Gate {
            Shut => "shut",
            Ajar => "ajar",
        }
    }

    crate::event_enum! {
        enum Nudge {
            Push => "PUSH",
        }
    }

    #[derive(Clone, Debug)]
    struct Force(u32);

    impl Context for Force {
        type Patch = Force;

        fn merge(&self, patch: Force) -> Self {
            patch
        }
    }

    #[test]
    fn simple_transition_has_no_behavior() {
        let t = simple_transition::<Gate, Nudge, Force>(Gate::Shut, Nudge::Push, Gate::Ajar);

        assert_eq!(t.from, Gate::Shut);
        assert_eq!(t.to, Gate::Ajar);
        assert!(!t.has_guard() && !t.has_action() && !t.has_effect());
    }

    #[test]
    fn guarded_transition_respects_guard() {
        let t = guarded_transition(Gate::Shut, Nudge::Push, Gate::Ajar, |f: &Force, _: &Event<Nudge>| {
            f.0 >= 10
        });

        assert!(t.allows(&Force(12), &Event::now(Nudge::Push)));
        assert!(!t.allows(&Force(3), &Event::now(Nudge::Push)));
    }
}

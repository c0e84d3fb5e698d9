//! Guard predicates for controlling state transitions.
//!
//! Guards are pure boolean functions over the current context and the
//! incoming event. They decide whether a matching transition may fire.

use super::context::Context;
use super::event::{Event, EventKind};
use std::sync::Arc;

/// Pure predicate that determines if a transition can execute.
///
/// A guard must be deterministic: for the same context and event it returns
/// the same answer, and it never has side effects. The engine may evaluate a
/// guard more than once per event (for `can_transition` and for ambiguity
/// detection).
///
/// # Example
///
/// ```rust
/// use statewise::core::{Event, EventKind, Guard};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Cmd { Withdraw }
///
/// impl EventKind for Cmd {
///     fn name(&self) -> &str { "WITHDRAW" }
/// }
///
/// #[derive(Clone, Debug)]
/// struct Wallet { balance: u64 }
///
/// impl statewise::core::Context for Wallet {
///     type Patch = Wallet;
///     fn merge(&self, patch: Wallet) -> Self { patch }
/// }
///
/// let has_funds = Guard::new(|w: &Wallet, _e: &Event<Cmd>| w.balance > 0);
///
/// assert!(has_funds.check(&Wallet { balance: 10 }, &Event::now(Cmd::Withdraw)));
/// assert!(!has_funds.check(&Wallet { balance: 0 }, &Event::now(Cmd::Withdraw)));
/// ```
pub struct Guard<C: Context, E: EventKind> {
    predicate: Arc<dyn Fn(&C, &Event<E>) -> bool + Send + Sync>,
}

impl<C: Context, E: EventKind> Guard<C, E> {
    /// Create a guard from a pure predicate function.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&C, &Event<E>) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    /// Evaluate the guard.
    pub fn check(&self, context: &C, event: &Event<E>) -> bool {
        (self.predicate)(context, event)
    }

    /// Guard that passes only when both guards pass.
    pub fn and(self, other: Guard<C, E>) -> Self {
        Guard::new(move |ctx, event| self.check(ctx, event) && other.check(ctx, event))
    }

    /// Guard that passes exactly when this one fails.
    pub fn negate(self) -> Self {
        Guard::new(move |ctx, event| !self.check(ctx, event))
    }
}

impl<C: Context, E: EventKind> Clone for Guard<C, E> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<C: Context, E: EventKind> std::fmt::Debug for Guard<C, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Guard(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum Tick {
        Tick,
    }

    impl EventKind for Tick {
        fn name(&self) -> &str {
            "TICK"
        }
    }

    #[derive(Clone, Debug)]
    struct Budget {
        remaining: u32,
    }

    impl Context for Budget {
        type Patch = Budget;

        fn merge(&self, patch: Budget) -> Self {
            patch
        }
    }

    fn tick() -> Event<Tick> {
        Event::new(Tick::Tick, Utc::now())
    }

    #[test]
    fn guard_reads_context() {
        let guard = Guard::new(|b: &Budget, _: &Event<Tick>| b.remaining > 0);

        assert!(guard.check(&Budget { remaining: 1 }, &tick()));
        assert!(!guard.check(&Budget { remaining: 0 }, &tick()));
    }

    #[test]
    fn guard_reads_event_payload() {
        let guard = Guard::new(|_: &Budget, e: &Event<Tick>| e.str_field("token").is_some());

        assert!(guard.check(&Budget { remaining: 0 }, &tick().with_field("token", "t")));
        assert!(!guard.check(&Budget { remaining: 0 }, &tick()));
    }

    #[test]
    fn guard_is_deterministic() {
        let guard = Guard::new(|b: &Budget, _: &Event<Tick>| b.remaining % 2 == 0);
        let ctx = Budget { remaining: 4 };
        let event = tick();

        assert_eq!(guard.check(&ctx, &event), guard.check(&ctx, &event));
    }

    #[test]
    fn combinators_compose() {
        let positive = Guard::new(|b: &Budget, _: &Event<Tick>| b.remaining > 0);
        let small = Guard::new(|b: &Budget, _: &Event<Tick>| b.remaining < 10);
        let in_range = positive.clone().and(small);
        let empty = positive.negate();

        assert!(in_range.check(&Budget { remaining: 5 }, &tick()));
        assert!(!in_range.check(&Budget { remaining: 50 }, &tick()));
        assert!(empty.check(&Budget { remaining: 0 }, &tick()));
        assert!(!empty.check(&Budget { remaining: 3 }, &tick()));
    }
}

//! The imperative shell around the pure core.
//!
//! This module interprets transition tables: it looks up entries, runs
//! guards and actions, commits state, and launches side effects.
//!
//! # Key Concepts
//!
//! - **Transitions**: table rows with optional guard, action and effect
//! - **State Machine**: owns `(state, context)` plus history and applies events
//! - **Effects**: async work launched on the tokio runtime after a commit;
//!   failures are reported but never undo the commit

mod handle;
mod machine;
mod transition;

pub use handle::{EffectFailure, EffectHandle, EffectObserver};
pub use machine::{AmbiguityPolicy, StateMachine, TransitionOutcome};
pub use transition::{
    ActionError, ActionFn, EffectError, EffectFn, Transition, TransitionError,
};

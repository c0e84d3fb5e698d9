//! Statewise: declarative finite-state machines with guarded transitions
//!
//! Statewise keeps a "pure core, imperative shell" split. Transition tables
//! are data, guards and actions are pure functions over `(context, event)`,
//! and the only asynchronous part, effects, runs after a transition has
//! committed and never rolls it back.
//!
//! # Core Concepts
//!
//! - **State / EventKind**: type-safe identities, usually declared with
//!   [`state_enum!`] and [`event_enum!`]
//! - **Transition table**: validated states and `(from, on) -> to` entries
//!   with optional guard, action and effect; first passing entry wins
//! - **StateMachine**: owns one `(state, context)` pair and its history
//! - **Diagnostics**: summaries, snapshots and DOT / Mermaid export
//! - **Auth**: an authentication lifecycle built on all of the above
//!
//! # Example
//!
//! ```rust
//! use statewise::builder::{guarded_transition, simple_transition, TableBuilder};
//! use statewise::core::Event;
//! use statewise::{event_enum, state_enum, StateMachine};
//!
//! state_enum! {
//!     enum Workflow {
//!         Initial => "initial",
//!         Processing => "processing",
//!         Complete => "complete",
//!     }
//!     final: [Complete]
//! }
//!
//! event_enum! {
//!     enum Step {
//!         Start => "START",
//!         Finish => "FINISH",
//!     }
//! }
//!
//! let table = TableBuilder::new()
//!     .states(Workflow::ALL.iter().copied())
//!     .add_transition(simple_transition(Workflow::Initial, Step::Start, Workflow::Processing))
//!     .add_transition(guarded_transition(
//!         Workflow::Processing,
//!         Step::Finish,
//!         Workflow::Complete,
//!         |_: &(), event: &Event<Step>| event.field("ok").is_some(),
//!     ))
//!     .build()
//!     .unwrap();
//!
//! let mut machine = StateMachine::new(table, Workflow::Initial, ()).unwrap();
//!
//! assert!(machine.transition(Event::now(Step::Start)).is_success());
//! assert!(!machine.transition(Event::now(Step::Finish)).is_success());
//! assert!(machine
//!     .transition(Event::now(Step::Finish).with_field("ok", true))
//!     .is_success());
//! assert!(machine.is_final());
//! assert_eq!(machine.history().len(), 2);
//! ```

pub mod auth;
pub mod builder;
pub mod core;
pub mod diagnostics;
pub mod effects;

// Re-export commonly used types
pub use builder::{ConfigError, TableBuilder, TransitionBuilder, TransitionTable};
pub use core::{Context, Event, EventKind, Guard, State, StateHistory};
pub use diagnostics::{MachineDiagnostics, MachineSnapshot};
pub use effects::{AmbiguityPolicy, StateMachine, TransitionError, TransitionOutcome};

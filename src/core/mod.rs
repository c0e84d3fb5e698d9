//! Core state machine types and logic.
//!
//! Everything in this module is pure data or pure functions:
//! - State and event identity via the `State` and `EventKind` traits
//! - Event values and their payloads
//! - Extended state via the `Context` trait
//! - Guard predicates for transition control
//! - The append-only transition history

mod context;
mod event;
mod guard;
mod history;
mod state;

pub use context::Context;
pub use event::{Event, EventKind, Payload};
pub use guard::Guard;
pub use history::{StateHistory, TransitionRecord};
pub use state::State;

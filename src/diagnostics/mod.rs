//! Introspection: structured summaries, snapshots and graph export.
//!
//! Nothing in this module changes a machine. Every view is computed from the
//! table and the machine's current `(state, context, history)`.

pub mod error;
pub mod graph;
pub mod snapshot;

pub use error::{SnapshotEncoding, SnapshotError};
pub use graph::{to_dot, to_mermaid};
pub use snapshot::{MachineSnapshot, SNAPSHOT_VERSION};

use crate::core::{Context, EventKind, State};
use crate::effects::StateMachine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A declared state as seen from a running machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateInfo {
    pub name: String,
    pub is_final: bool,
    pub is_current: bool,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

/// A table entry with its closures reduced to flags.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionInfo {
    pub from: String,
    pub to: String,
    pub on: String,
    pub guarded: bool,
    pub has_action: bool,
    pub has_effect: bool,
}

/// Serializable summary of a machine and its table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MachineDiagnostics {
    pub current_state: String,
    pub is_final: bool,
    pub states: Vec<StateInfo>,
    pub transitions: Vec<TransitionInfo>,
    pub history_len: usize,
}

impl MachineDiagnostics {
    /// Entries that leave the current state.
    pub fn outgoing(&self) -> impl Iterator<Item = &TransitionInfo> {
        self.transitions
            .iter()
            .filter(move |t| t.from == self.current_state)
    }
}

impl<S: State, E: EventKind, C: Context> StateMachine<S, E, C> {
    /// Summarize the table and where the machine currently is.
    pub fn diagnostics(&self) -> MachineDiagnostics {
        let current = self.current_state();

        let states = self
            .table()
            .states()
            .iter()
            .map(|def| StateInfo {
                name: def.name().to_string(),
                is_final: def.is_final,
                is_current: def.state == *current,
                metadata: def.metadata.clone(),
            })
            .collect();

        let transitions = self
            .table()
            .transitions()
            .iter()
            .map(|t| TransitionInfo {
                from: t.from.name().to_string(),
                to: t.to.name().to_string(),
                on: t.on.name().to_string(),
                guarded: t.has_guard(),
                has_action: t.has_action(),
                has_effect: t.has_effect(),
            })
            .collect();

        MachineDiagnostics {
            current_state: current.name().to_string(),
            is_final: self.is_final(),
            states,
            transitions,
            history_len: self.history().len(),
        }
    }
}

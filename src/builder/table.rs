//! Declarative transition tables.

use crate::builder::error::{BuildError, ConfigError};
use crate::builder::transition::TransitionBuilder;
use crate::builder::validate::validate_table;
use crate::core::{Context, EventKind, State};
use crate::effects::Transition;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A declared state and its static attributes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateDef<S: State> {
    pub state: S,
    pub is_final: bool,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl<S: State> StateDef<S> {
    pub fn new(state: S) -> Self {
        let is_final = state.is_final();
        Self {
            state,
            is_final,
            metadata: Map::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.state.name()
    }
}

/// Validated, immutable set of states and transitions.
///
/// Transitions keep their declaration order. When several entries share a
/// `(from, on)` key, lookup considers them in that order and the first one
/// whose guard passes wins.
pub struct TransitionTable<S: State, E: EventKind, C: Context> {
    states: Vec<StateDef<S>>,
    transitions: Vec<Transition<S, E, C>>,
}

impl<S: State, E: EventKind, C: Context> TransitionTable<S, E, C> {
    /// Validate and assemble a table.
    pub fn new(
        states: Vec<StateDef<S>>,
        transitions: Vec<Transition<S, E, C>>,
    ) -> Result<Self, ConfigError> {
        validate_table(&states, &transitions)
            .map_err(|issues| ConfigError::InvalidTable { issues })?;
        Ok(Self {
            states,
            transitions,
        })
    }

    pub fn builder() -> TableBuilder<S, E, C> {
        TableBuilder::new()
    }

    pub fn states(&self) -> &[StateDef<S>] {
        &self.states
    }

    pub fn transitions(&self) -> &[Transition<S, E, C>] {
        &self.transitions
    }

    pub fn state_def(&self, state: &S) -> Option<&StateDef<S>> {
        self.states.iter().find(|def| def.state == *state)
    }

    pub fn is_declared(&self, state: &S) -> bool {
        self.state_def(state).is_some()
    }

    /// Entries leaving `state`, in declaration order.
    pub fn transitions_from<'a>(
        &'a self,
        state: &'a S,
    ) -> impl Iterator<Item = &'a Transition<S, E, C>> + 'a {
        self.transitions.iter().filter(move |t| t.from == *state)
    }

    /// Entries keyed by `(state, kind)` with their table positions.
    pub fn candidates<'a>(
        &'a self,
        state: &'a S,
        kind: &'a E,
    ) -> impl Iterator<Item = (usize, &'a Transition<S, E, C>)> + 'a {
        self.transitions
            .iter()
            .enumerate()
            .filter(move |(_, t)| t.matches(state, kind))
    }

    /// Distinct event kinds used anywhere in the table, in first-use order.
    pub fn events(&self) -> Vec<&E> {
        let mut events: Vec<&E> = Vec::new();
        for transition in &self.transitions {
            if !events.contains(&&transition.on) {
                events.push(&transition.on);
            }
        }
        events
    }
}

impl<S: State, E: EventKind, C: Context> std::fmt::Debug for TransitionTable<S, E, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionTable")
            .field("states", &self.states.len())
            .field("transitions", &self.transitions)
            .finish()
    }
}

/// Builder for transition tables with a fluent API.
pub struct TableBuilder<S: State, E: EventKind, C: Context> {
    states: Vec<StateDef<S>>,
    transitions: Vec<Transition<S, E, C>>,
}

impl<S: State, E: EventKind, C: Context> TableBuilder<S, E, C> {
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            transitions: Vec::new(),
        }
    }

    /// Declare a state.
    pub fn state(mut self, state: S) -> Self {
        self.states.push(StateDef::new(state));
        self
    }

    /// Declare a state with diagnostic metadata.
    pub fn state_with_metadata(mut self, state: S, metadata: Map<String, Value>) -> Self {
        let mut def = StateDef::new(state);
        def.metadata = metadata;
        self.states.push(def);
        self
    }

    /// Declare several states at once.
    pub fn states(mut self, states: impl IntoIterator<Item = S>) -> Self {
        self.states.extend(states.into_iter().map(StateDef::new));
        self
    }

    /// Add a transition using a builder.
    /// Returns an error if the builder fails validation.
    pub fn transition(mut self, builder: TransitionBuilder<S, E, C>) -> Result<Self, BuildError> {
        self.transitions.push(builder.build()?);
        Ok(self)
    }

    /// Add a pre-built transition.
    pub fn add_transition(mut self, transition: Transition<S, E, C>) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Add multiple transitions at once.
    pub fn transitions(mut self, transitions: Vec<Transition<S, E, C>>) -> Self {
        self.transitions.extend(transitions);
        self
    }

    /// Validate and build the table.
    pub fn build(self) -> Result<TransitionTable<S, E, C>, ConfigError> {
        TransitionTable::new(self.states, self.transitions)
    }
}

impl<S: State, E: EventKind, C: Context> Default for TableBuilder<S, E, C> {
    fn default() -> Self {
        Self::new()
    }
}

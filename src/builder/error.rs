//! Build and configuration errors for transition tables and machines.

use thiserror::Error;

/// Errors that can occur when building a single transition.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("Transition source state not specified. Call .from(state)")]
    MissingFromState,

    #[error("Transition target state not specified. Call .to(state)")]
    MissingToState,

    #[error("Transition event not specified. Call .on(event)")]
    MissingEvent,
}

/// A structural problem found while validating a transition table.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TableIssue {
    #[error("table declares no states")]
    NoStates,

    #[error("state '{state}' is declared more than once")]
    DuplicateState { state: String },

    #[error("transition on '{event}' starts from undeclared state '{state}'")]
    UndeclaredSource { state: String, event: String },

    #[error("transition on '{event}' targets undeclared state '{state}'")]
    UndeclaredTarget { state: String, event: String },
}

/// Fatal misconfiguration. A machine is never constructed from a table
/// that produces one of these.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid transition table: {}", describe(.issues))]
    InvalidTable { issues: Vec<TableIssue> },

    #[error("initial state '{state}' is not declared in the table")]
    UnknownInitialState { state: String },

    #[error(transparent)]
    Build(#[from] BuildError),
}

fn describe(issues: &[TableIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_table_lists_every_issue() {
        let err = ConfigError::InvalidTable {
            issues: vec![
                TableIssue::NoStates,
                TableIssue::UndeclaredTarget {
                    state: "gone".into(),
                    event: "GO".into(),
                },
            ],
        };

        let message = err.to_string();
        assert!(message.contains("declares no states"));
        assert!(message.contains("undeclared state 'gone'"));
    }

    #[test]
    fn build_errors_convert() {
        let err: ConfigError = BuildError::MissingEvent.into();
        assert_eq!(err, ConfigError::Build(BuildError::MissingEvent));
    }
}

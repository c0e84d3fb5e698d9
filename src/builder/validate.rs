//! Structural validation of transition tables.
//!
//! Every check runs, and all issues are reported together rather than
//! stopping at the first one.

use crate::builder::error::TableIssue;
use crate::builder::table::StateDef;
use crate::core::{Context, EventKind, State};
use crate::effects::Transition;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<TableIssue>>;

fn require(ok: bool, issue: impl FnOnce() -> TableIssue) -> Check {
    if ok {
        Validation::success(())
    } else {
        Validation::fail(issue())
    }
}

/// Validate a table, returning every issue found.
pub(crate) fn validate_table<S, E, C>(
    states: &[StateDef<S>],
    transitions: &[Transition<S, E, C>],
) -> Result<(), Vec<TableIssue>>
where
    S: State,
    E: EventKind,
    C: Context,
{
    let declared = |state: &S| states.iter().any(|def| def.state == *state);
    let mut checks: Vec<Check> = Vec::new();

    checks.push(require(!states.is_empty(), || TableIssue::NoStates));

    for (index, def) in states.iter().enumerate() {
        let first = !states[..index].iter().any(|other| other.state == def.state);
        checks.push(require(first, || TableIssue::DuplicateState {
            state: def.state.name().to_string(),
        }));
    }

    for transition in transitions {
        checks.push(require(declared(&transition.from), || {
            TableIssue::UndeclaredSource {
                state: transition.from.name().to_string(),
                event: transition.on.name().to_string(),
            }
        }));
        checks.push(require(declared(&transition.to), || {
            TableIssue::UndeclaredTarget {
                state: transition.to.name().to_string(),
                event: transition.on.name().to_string(),
            }
        }));
    }

    match Validation::all_vec(checks) {
        Validation::Success(_) => Ok(()),
        Validation::Failure(issues) => Err(issues.iter().cloned().collect()),
    }
}

//! Handles and reports for side effects launched after a commit.

use crate::core::{EventKind, State};
use crate::effects::transition::EffectError;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// A side effect that failed after its transition had already committed.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectFailure<S: State, E: EventKind> {
    pub from: S,
    pub to: S,
    pub event: E,
    pub error: EffectError,
}

/// Observability sink for effect failures.
pub type EffectObserver<S, E> = Arc<dyn Fn(&EffectFailure<S, E>) + Send + Sync>;

/// Handle to a launched effect.
///
/// Dropping the handle does not cancel the effect; it keeps running on the
/// runtime. Awaiting `wait` is how a caller orders its next step after a
/// specific effect.
#[derive(Debug)]
pub struct EffectHandle {
    inner: Launch,
}

#[derive(Debug)]
enum Launch {
    Spawned(JoinHandle<Result<(), EffectError>>),
    Rejected(EffectError),
}

impl EffectHandle {
    pub(crate) fn spawned(handle: JoinHandle<Result<(), EffectError>>) -> Self {
        Self {
            inner: Launch::Spawned(handle),
        }
    }

    pub(crate) fn rejected(error: EffectError) -> Self {
        Self {
            inner: Launch::Rejected(error),
        }
    }

    /// Whether the effect has run to completion (or never started).
    pub fn is_finished(&self) -> bool {
        match &self.inner {
            Launch::Spawned(handle) => handle.is_finished(),
            Launch::Rejected(_) => true,
        }
    }

    /// Wait for the effect and return its result.
    pub async fn wait(self) -> Result<(), EffectError> {
        match self.inner {
            Launch::Spawned(handle) => match handle.await {
                Ok(result) => result,
                Err(join_error) => Err(EffectError::Aborted(join_error.to_string())),
            },
            Launch::Rejected(error) => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wait_returns_effect_result() {
        let ok = EffectHandle::spawned(tokio::spawn(async { Ok::<(), EffectError>(()) }));
        assert_eq!(ok.wait().await, Ok(()));

        let failed =
            EffectHandle::spawned(tokio::spawn(async { Err::<(), _>(EffectError::failed("disk full")) }));
        assert_eq!(failed.wait().await, Err(EffectError::failed("disk full")));
    }

    #[tokio::test]
    async fn panicking_effect_is_reported_as_aborted() {
        let handle = EffectHandle::spawned(tokio::spawn(async {
            if true {
                panic!("boom");
            }
            Ok::<(), EffectError>(())
        }));

        assert!(matches!(handle.wait().await, Err(EffectError::Aborted(_))));
    }

    #[tokio::test]
    async fn rejected_handle_is_finished() {
        let handle = EffectHandle::rejected(EffectError::NoRuntime);
        assert!(handle.is_finished());
        assert_eq!(handle.wait().await, Err(EffectError::NoRuntime));
    }
}

//! Extended state carried alongside the current state.

use std::fmt::Debug;

/// Data carried next to the machine's state.
///
/// Actions never mutate a context in place. They return a `Patch`, and the
/// engine builds the next context with `merge`, which replaces top-level
/// fields named by the patch and keeps the rest (a one-level, shallow merge).
/// The previous context is untouched until the transition commits.
pub trait Context: Clone + Debug + Send + Sync + 'static {
    /// Partial update produced by an action.
    type Patch: Send;

    /// Produce the next context by applying `patch` on top of `self`.
    fn merge(&self, patch: Self::Patch) -> Self;
}

/// Unit context for machines that only track state.
impl Context for () {
    type Patch = ();

    fn merge(&self, _patch: ()) -> Self {}
}

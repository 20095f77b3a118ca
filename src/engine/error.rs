//! Tick-time errors.

use crate::core::ConditionError;
use thiserror::Error;

/// Errors surfaced by [`Hsm::tick`](crate::Hsm::tick).
///
/// Guard failures abort the tick before any state mutation: triggers are
/// chosen while descending the active chain, and `current` pointers only
/// move on the way back up. The remaining variants are configuration
/// errors the builder normally rejects; they are kept as fail-fast
/// backstops.
#[derive(Debug, Error)]
pub enum TickError {
    #[error("composite state '{state}' has no initial child to enter")]
    MissingInitialChild { state: String },

    #[error("guard evaluation failed on a transition out of '{state}'")]
    Guard {
        state: String,
        #[source]
        source: ConditionError,
    },

    #[error("transition to '{target}' could not be resolved within the tree")]
    UnresolvedTransition { target: String },
}

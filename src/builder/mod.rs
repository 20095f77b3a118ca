//! Builder API for assembling state trees.
//!
//! Trees are wired up imperatively — create states, attach children, set
//! initial children, add transitions — and validated as a whole by
//! [`HsmBuilder::build`], which is the only way to obtain a runnable
//! machine.

pub mod error;
pub mod machine;
pub mod macros;

pub use error::BuildError;
pub use machine::HsmBuilder;

use crate::core::{Latch, NodeId, Transition};

/// Transition guarded by a plain closure.
///
/// # Example
///
/// ```rust
/// use stratum::builder::transition_when;
/// use stratum::{HsmBuilder, StateHooks};
///
/// let mut builder = HsmBuilder::new();
/// let root = builder.composite("Root", StateHooks::none());
/// let idle = builder.leaf_in(root, "Idle", StateHooks::none()).unwrap();
/// let busy = builder.leaf_in(root, "Busy", StateHooks::none()).unwrap();
///
/// builder.add_transition(idle, transition_when(busy, || true));
/// let machine = builder.build(root).unwrap();
/// ```
pub fn transition_when<F>(target: NodeId, guard: F) -> Transition
where
    F: Fn() -> bool + Send + Sync + 'static,
{
    Transition::new(target, guard)
}

/// Transition guarded by a clone of `latch`, leaving the original with
/// the caller for firing and resetting.
pub fn latched_transition(target: NodeId, latch: &Latch) -> Transition {
    Transition::new(target, latch.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StateHooks;

    #[test]
    fn transition_when_wraps_a_closure() {
        let mut builder = HsmBuilder::new();
        let root = builder.composite("Root", StateHooks::none());
        let a = builder.leaf_in(root, "A", StateHooks::none()).unwrap();
        let b = builder.leaf_in(root, "B", StateHooks::none()).unwrap();
        builder.add_transition(a, transition_when(b, || true));

        let mut machine = builder.build(root).unwrap();
        machine.tick().unwrap();
        machine.tick().unwrap();
        assert_eq!(machine.active_chain(), vec![root, b]);
    }

    #[test]
    fn latched_transition_fires_with_the_callers_latch() {
        let latch = Latch::new();

        let mut builder = HsmBuilder::new();
        let root = builder.composite("Root", StateHooks::none());
        let a = builder.leaf_in(root, "A", StateHooks::none()).unwrap();
        let b = builder.leaf_in(root, "B", StateHooks::none()).unwrap();
        builder.add_transition(a, latched_transition(b, &latch));

        let mut machine = builder.build(root).unwrap();
        machine.tick().unwrap();
        machine.tick().unwrap();
        assert_eq!(machine.active_chain(), vec![root, a]);

        latch.fire();
        machine.tick().unwrap();
        assert_eq!(machine.active_chain(), vec![root, b]);
    }
}

//! Stratum: a tick-driven hierarchical state machine engine.
//!
//! A machine is a tree of states. Composite states own an active child;
//! leaf states are terminal. Once per tick the host calls
//! [`Hsm::tick`] and receives an ordered list of opaque
//! [`ActionHandle`]s to invoke — the engine itself performs no I/O, no
//! timing, and never executes an action.
//!
//! Transitions may target any state in the tree. Routing is driven by the
//! signed level delta between source and target, carried through the
//! recursive update: zero resolves as a sibling transition, positive
//! exits upward level by level, negative re-enters downward through the
//! target's ancestor chain. Transitions attached directly to a state are
//! checked before anything nested beneath it, and the first true guard in
//! declaration order wins.
//!
//! # Core Concepts
//!
//! - **Action handles**: invokable tokens the engine orders but never runs
//! - **Conditions**: guard predicates — comparisons, combinators, latches
//! - **Builder**: assembles and validates the tree before any tick runs
//!
//! # Example
//!
//! ```rust
//! use stratum::{hooks, HsmBuilder, Transition};
//!
//! let mut builder = HsmBuilder::new();
//! let root = builder.composite("Root", hooks!());
//! let idle = builder.leaf_in(root, "Idle", hooks!()).unwrap();
//! let busy = builder.leaf_in(root, "Busy", hooks!()).unwrap();
//! builder.add_transition(idle, Transition::new(busy, || true));
//!
//! let mut machine = builder.build(root).unwrap();
//!
//! let actions = machine.tick().unwrap(); // enters Idle
//! assert_eq!(actions.len(), 1);
//! for action in &actions {
//!     action.invoke();
//! }
//!
//! machine.tick().unwrap(); // Idle -> Busy
//! let chain = machine.active_chain();
//! assert_eq!(machine.name(chain[1]), "Busy");
//! ```

pub mod builder;
pub mod core;
pub mod engine;
pub mod flat;

// Re-export commonly used types
pub use crate::builder::{BuildError, HsmBuilder};
pub use crate::core::{
    ActionHandle, And, CompareOp, Comparison, Condition, ConditionError, Latch, NodeId, Not, Or,
    Reset, StateHooks, TraceLog, Transition, TransitionRecord,
};
pub use crate::engine::{Hsm, TickError};

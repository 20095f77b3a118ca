//! Build errors for the machine builder.

use thiserror::Error;

/// Errors detected while assembling or validating a state tree.
///
/// Everything here is a configuration error: the tree is rejected before
/// a machine exists, so no tick ever runs against a malformed tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("state '{state}' is a leaf and cannot have children")]
    NotAComposite { state: String },

    #[error("state '{child}' is already attached to '{parent}'")]
    AlreadyAttached { child: String, parent: String },

    #[error("attaching '{child}' under '{parent}' would create a cycle")]
    CycleDetected { parent: String, child: String },

    #[error("child index {index} is out of range for composite '{parent}'")]
    ChildIndexOutOfRange { parent: String, index: usize },

    #[error("the root state '{state}' must not have a parent")]
    AttachedRoot { state: String },

    #[error("composite state '{state}' has no children and can never be entered")]
    ChildlessComposite { state: String },

    #[error("state '{state}' is not reachable from the root")]
    DetachedState { state: String },

    #[error("a transition out of '{from}' targets the root state and can never resolve")]
    TransitionToRoot { from: String },

    #[error("transition from '{from}' to '{target}' cannot be routed through a common parent")]
    UnroutableTransition { from: String, target: String },
}

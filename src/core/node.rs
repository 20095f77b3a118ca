//! Arena-allocated state nodes.
//!
//! Ownership flows strictly machine → arena → nodes; `parent` and
//! `current` are plain indices used only for navigation, never for
//! lifetime management.

use super::action::StateHooks;
use super::transition::Transition;

/// Index of a state node within one machine's arena.
///
/// Ids are only meaningful for the machine (or builder) that issued them;
/// reusing an id across machines is a contract violation and fails fast.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// One state in the tree, leaf or composite.
pub(crate) struct Node {
    pub(crate) name: String,
    pub(crate) level: u32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) hooks: StateHooks,
    pub(crate) transitions: Vec<Transition>,
    pub(crate) kind: NodeKind,
}

pub(crate) enum NodeKind {
    Leaf,
    Composite(CompositeData),
}

/// Child bookkeeping for a composite state.
///
/// `current` is `None` exactly when the composite has never been entered
/// or has just been exited on the way up through a cross-level transition.
#[derive(Default)]
pub(crate) struct CompositeData {
    pub(crate) children: Vec<NodeId>,
    pub(crate) initial: Option<NodeId>,
    pub(crate) current: Option<NodeId>,
}

impl Node {
    pub(crate) fn leaf(name: impl Into<String>, hooks: StateHooks) -> Self {
        Self {
            name: name.into(),
            level: 0,
            parent: None,
            hooks,
            transitions: Vec::new(),
            kind: NodeKind::Leaf,
        }
    }

    pub(crate) fn composite(name: impl Into<String>, hooks: StateHooks) -> Self {
        Self {
            name: name.into(),
            level: 0,
            parent: None,
            hooks,
            transitions: Vec::new(),
            kind: NodeKind::Composite(CompositeData::default()),
        }
    }

    pub(crate) fn is_composite(&self) -> bool {
        matches!(self.kind, NodeKind::Composite(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_nodes_are_detached_at_level_zero() {
        let leaf = Node::leaf("Idle", StateHooks::none());
        assert_eq!(leaf.name, "Idle");
        assert_eq!(leaf.level, 0);
        assert!(leaf.parent.is_none());
        assert!(!leaf.is_composite());

        let composite = Node::composite("Root", StateHooks::none());
        assert!(composite.is_composite());
        match &composite.kind {
            NodeKind::Composite(data) => {
                assert!(data.children.is_empty());
                assert!(data.initial.is_none());
                assert!(data.current.is_none());
            }
            NodeKind::Leaf => unreachable!(),
        }
    }
}

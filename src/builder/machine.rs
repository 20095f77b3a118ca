//! Builder for assembling and validating state trees.

use crate::builder::error::BuildError;
use crate::core::node::{Node, NodeKind};
use crate::core::{NodeId, StateHooks, Transition};
use crate::engine::Hsm;

/// Assembles a state tree, then validates the whole thing in
/// [`build`](HsmBuilder::build) before handing out a runnable
/// [`Hsm`].
///
/// States are created detached and attached with
/// [`add_child`](HsmBuilder::add_child) (or created pre-attached with the
/// `*_in` variants). Level bookkeeping happens at attach time —
/// `child.level = parent.level + 1`, descendants re-leveled — so subtrees
/// may be assembled in any order.
///
/// # Example
///
/// ```rust
/// use stratum::{HsmBuilder, StateHooks, Transition};
///
/// let mut builder = HsmBuilder::new();
/// let root = builder.composite("Root", StateHooks::none());
/// let idle = builder.leaf_in(root, "Idle", StateHooks::none()).unwrap();
/// let busy = builder.leaf_in(root, "Busy", StateHooks::none()).unwrap();
/// builder.add_transition(idle, Transition::new(busy, || true));
///
/// let machine = builder.build(root).unwrap();
/// assert_eq!(machine.name(machine.root()), "Root");
/// ```
pub struct HsmBuilder {
    nodes: Vec<Node>,
}

impl HsmBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Create a detached composite state.
    pub fn composite(&mut self, name: impl Into<String>, hooks: StateHooks) -> NodeId {
        self.push(Node::composite(name, hooks))
    }

    /// Create a detached leaf state.
    pub fn leaf(&mut self, name: impl Into<String>, hooks: StateHooks) -> NodeId {
        self.push(Node::leaf(name, hooks))
    }

    /// Create a composite state attached to `parent`.
    pub fn composite_in(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        hooks: StateHooks,
    ) -> Result<NodeId, BuildError> {
        let id = self.composite(name, hooks);
        self.add_child(parent, id)?;
        Ok(id)
    }

    /// Create a leaf state attached to `parent`.
    pub fn leaf_in(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        hooks: StateHooks,
    ) -> Result<NodeId, BuildError> {
        let id = self.leaf(name, hooks);
        self.add_child(parent, id)?;
        Ok(id)
    }

    /// Attach a detached state as the last child of `parent`.
    ///
    /// The first child attached to a composite becomes its initial child
    /// until [`set_initial`](HsmBuilder::set_initial) says otherwise.
    /// Re-parenting an attached state is unsupported and rejected.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), BuildError> {
        if !self.node(parent).is_composite() {
            return Err(BuildError::NotAComposite {
                state: self.name_of(parent),
            });
        }
        if let Some(existing) = self.node(child).parent {
            return Err(BuildError::AlreadyAttached {
                child: self.name_of(child),
                parent: self.name_of(existing),
            });
        }

        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(BuildError::CycleDetected {
                    parent: self.name_of(parent),
                    child: self.name_of(child),
                });
            }
            cursor = self.node(id).parent;
        }

        let level = self.node(parent).level + 1;
        self.nodes[child.index()].parent = Some(parent);
        if let NodeKind::Composite(data) = &mut self.nodes[parent.index()].kind {
            data.children.push(child);
            if data.initial.is_none() {
                data.initial = Some(child);
            }
        }
        self.relevel(child, level);
        Ok(())
    }

    /// Designate `child` as the state `parent` activates when entered.
    ///
    /// A detached `child` is attached first; a state owned by a different
    /// parent is rejected.
    pub fn set_initial(&mut self, parent: NodeId, child: NodeId) -> Result<(), BuildError> {
        match self.node(child).parent {
            Some(owner) if owner == parent => {}
            Some(owner) => {
                return Err(BuildError::AlreadyAttached {
                    child: self.name_of(child),
                    parent: self.name_of(owner),
                })
            }
            None => self.add_child(parent, child)?,
        }
        if let NodeKind::Composite(data) = &mut self.nodes[parent.index()].kind {
            data.initial = Some(child);
        }
        Ok(())
    }

    /// Designate the `index`-th attached child as the initial child.
    pub fn set_initial_index(&mut self, parent: NodeId, index: usize) -> Result<(), BuildError> {
        let child = match &self.node(parent).kind {
            NodeKind::Composite(data) => {
                data.children
                    .get(index)
                    .copied()
                    .ok_or(BuildError::ChildIndexOutOfRange {
                        parent: self.name_of(parent),
                        index,
                    })?
            }
            NodeKind::Leaf => {
                return Err(BuildError::NotAComposite {
                    state: self.name_of(parent),
                })
            }
        };
        self.set_initial(parent, child)
    }

    /// Append a transition to `source`'s ordered outgoing list.
    /// Declaration order is the tie-break: on a tick where several guards
    /// are true, the first one declared wins.
    pub fn add_transition(&mut self, source: NodeId, transition: Transition) {
        self.nodes[source.index()].transitions.push(transition);
    }

    /// Validate the whole tree and produce a runnable machine.
    ///
    /// Checks performed here rather than mid-tick: the root is
    /// unattached, every composite has children (and therefore an initial
    /// child), every state is reachable from the root, no transition
    /// targets the root, and every transition's endpoints converge at a
    /// common parent so the level-delta routing can resolve it.
    pub fn build(mut self, root: NodeId) -> Result<Hsm, BuildError> {
        if self.node(root).parent.is_some() {
            return Err(BuildError::AttachedRoot {
                state: self.name_of(root),
            });
        }
        self.relevel(root, 0);

        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            visited[id.index()] = true;
            if let NodeKind::Composite(data) = &self.node(id).kind {
                if data.children.is_empty() {
                    return Err(BuildError::ChildlessComposite {
                        state: self.name_of(id),
                    });
                }
                stack.extend(data.children.iter().copied());
            }
        }
        if let Some(index) = visited.iter().position(|seen| !seen) {
            return Err(BuildError::DetachedState {
                state: self.nodes[index].name.clone(),
            });
        }

        for index in 0..self.nodes.len() {
            let source = NodeId(index);
            for transition in &self.node(source).transitions {
                let target = transition.target();
                if target == root {
                    return Err(BuildError::TransitionToRoot {
                        from: self.name_of(source),
                    });
                }
                if !self.converges(source, target) {
                    return Err(BuildError::UnroutableTransition {
                        from: self.name_of(source),
                        target: self.name_of(target),
                    });
                }
            }
        }

        Ok(Hsm::new(self.nodes, root))
    }

    /// True when the level-delta walk between `source` and `target` ends
    /// at a composite that actually parents the shallower endpoint's
    /// chain: the transition resolves at the parent of whichever endpoint
    /// is higher, so the other endpoint's ancestor at that depth must be
    /// a sibling of it.
    fn converges(&self, source: NodeId, target: NodeId) -> bool {
        let source_level = self.node(source).level;
        let target_level = self.node(target).level;
        if target_level <= source_level {
            let ancestor = self.ancestor_at(source, target_level);
            self.node(ancestor).parent == self.node(target).parent
        } else {
            let ancestor = self.ancestor_at(target, source_level);
            self.node(ancestor).parent == self.node(source).parent
        }
    }

    fn ancestor_at(&self, id: NodeId, level: u32) -> NodeId {
        let mut cursor = id;
        while self.node(cursor).level > level {
            cursor = self
                .node(cursor)
                .parent
                .expect("states above level zero always have a parent");
        }
        cursor
    }

    fn relevel(&mut self, id: NodeId, level: u32) {
        self.nodes[id.index()].level = level;
        let children = match &self.node(id).kind {
            NodeKind::Composite(data) => data.children.clone(),
            NodeKind::Leaf => return,
        };
        for child in children {
            self.relevel(child, level + 1);
        }
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    fn name_of(&self, id: NodeId) -> String {
        self.node(id).name.clone()
    }
}

impl Default for HsmBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//! The HSM driver.

use crate::core::node::{CompositeData, Node, NodeKind};
use crate::core::{ActionHandle, NodeId, TraceLog};

use super::error::TickError;

/// A hierarchical state machine: an arena of state nodes plus the root id.
///
/// Built through [`HsmBuilder`](crate::HsmBuilder), which validates the
/// tree before handing one of these out. One `tick` call performs the
/// whole recursive walk synchronously; callers must serialize ticks on a
/// given instance.
pub struct Hsm {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    pub(crate) ticks: u64,
    pub(crate) trace: TraceLog,
}

impl Hsm {
    pub(crate) fn new(nodes: Vec<Node>, root: NodeId) -> Self {
        Self {
            nodes,
            root,
            ticks: 0,
            trace: TraceLog::new(),
        }
    }

    /// Advance the machine one tick.
    ///
    /// Returns the ordered action handles for the tick; the host invokes
    /// them in listed order. The engine guarantees order, not synchronous
    /// completion of the handles themselves.
    pub fn tick(&mut self) -> Result<Vec<ActionHandle>, TickError> {
        self.ticks += 1;
        let result = self.update(self.root)?;
        if let Some(pending) = result.pending {
            return Err(TickError::UnresolvedTransition {
                target: self.node(pending.target).name.clone(),
            });
        }
        Ok(result.actions)
    }

    /// Exit the whole machine: the active chain is exited deepest first,
    /// every `current` pointer is cleared, and the root's own exit handle
    /// comes last. The next tick re-enters from the root's initial child.
    pub fn exit(&mut self) -> Vec<ActionHandle> {
        let chain = self.active_chain();
        let mut actions = Vec::with_capacity(chain.len());
        for &id in chain.iter().rev() {
            actions.push(self.node(id).hooks.exit.clone());
            if let NodeKind::Composite(data) = &mut self.nodes[id.index()].kind {
                data.current = None;
            }
        }
        actions
    }

    /// The currently active nodes from the root down to the deepest
    /// active node. Never mutates state.
    pub fn active_chain(&self) -> Vec<NodeId> {
        let mut chain = vec![self.root];
        let mut cursor = self.root;
        loop {
            let next = match &self.node(cursor).kind {
                NodeKind::Composite(data) => data.current,
                NodeKind::Leaf => None,
            };
            match next {
                Some(id) => {
                    chain.push(id);
                    cursor = id;
                }
                None => break,
            }
        }
        chain
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.node(id).name
    }

    /// Tree depth of a node; the root is level 0.
    pub fn level(&self, id: NodeId) -> u32 {
        self.node(id).level
    }

    /// Number of `tick` calls made so far, including failed ones.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Diagnostic log of every taken transition.
    pub fn trace(&self) -> &TraceLog {
        &self.trace
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub(crate) fn composite(&self, id: NodeId) -> &CompositeData {
        match &self.node(id).kind {
            NodeKind::Composite(data) => data,
            NodeKind::Leaf => panic!("state '{}' has no children", self.node(id).name),
        }
    }

    pub(crate) fn composite_mut(&mut self, id: NodeId) -> &mut CompositeData {
        match &mut self.nodes[id.index()].kind {
            NodeKind::Composite(data) => data,
            NodeKind::Leaf => panic!("state {id:?} has no children"),
        }
    }
}

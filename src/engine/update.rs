//! The recursive update and transition-routing protocol.
//!
//! Each tick walks the active chain top-down. A composite first scans its
//! current child's outgoing transitions in declaration order; only when
//! none fire does it delegate to the child's own update. The first true
//! guard anywhere on the walk becomes the tick's single trigger, and a
//! transition attached directly to a state therefore pre-empts anything
//! nested further down beneath that same state on the tick it fires.
//!
//! A trigger is resolved by the signed level delta between its source and
//! target, carried in the result as it is passed back up the recursion:
//! zero resolves locally as a sibling transition, positive exits one
//! level and bubbles up with the count decremented, negative routes
//! downward through [`enter_towards`]. Deriving the direction from the
//! two endpoints' depths alone is sufficient because transitions are
//! evaluated strictly along the single currently-active chain; no
//! common-ancestor computation is needed.
//!
//! Guards are evaluated on the way down and `current` pointers only move
//! on the way back up, so a failing guard aborts the tick with no partial
//! mutation.
//!
//! [`enter_towards`]: Hsm::enter_towards

use chrono::Utc;

use crate::core::node::NodeKind;
use crate::core::{ActionHandle, NodeId, TransitionRecord};

use super::error::TickError;
use super::machine::Hsm;

/// Transient outcome of updating one level of the chain. Created and
/// discarded within a single tick, never persisted.
pub(crate) struct UpdateResult {
    pub(crate) actions: Vec<ActionHandle>,
    pub(crate) pending: Option<Pending>,
}

impl UpdateResult {
    fn resolved(actions: Vec<ActionHandle>) -> Self {
        Self {
            actions,
            pending: None,
        }
    }
}

/// Snapshot of a triggered transition awaiting resolution further up the
/// chain. `remaining` counts the levels still to cross; it is only
/// meaningful while the transition is pending, which is why it lives here
/// rather than on [`UpdateResult`].
pub(crate) struct Pending {
    pub(crate) source: NodeId,
    pub(crate) target: NodeId,
    pub(crate) action: ActionHandle,
    pub(crate) remaining: i32,
}

impl Hsm {
    pub(crate) fn update(&mut self, id: NodeId) -> Result<UpdateResult, TickError> {
        if matches!(self.node(id).kind, NodeKind::Leaf) {
            return Ok(UpdateResult::resolved(vec![self.node(id).hooks.tick.clone()]));
        }
        self.update_composite(id)
    }

    fn update_composite(&mut self, id: NodeId) -> Result<UpdateResult, TickError> {
        let current = match self.composite(id).current {
            Some(current) => current,
            None => {
                // First entry: activate the initial child and emit only its
                // entry handle. No transition scan happens on this tick.
                let initial = self.composite(id).initial.ok_or_else(|| {
                    TickError::MissingInitialChild {
                        state: self.node(id).name.clone(),
                    }
                })?;
                self.composite_mut(id).current = Some(initial);
                let entry = self.node(initial).hooks.entry.clone();
                return Ok(UpdateResult::resolved(vec![entry]));
            }
        };

        let trigger = self.scan_transitions(current)?;

        let mut result = match trigger {
            Some(pending) => UpdateResult {
                actions: Vec::new(),
                pending: Some(pending),
            },
            None => self.update(current)?,
        };

        match result.pending.take() {
            Some(mut pending) => {
                if pending.remaining == 0 {
                    // Sibling-level transition: resolve here.
                    result.actions.push(self.node(current).hooks.exit.clone());
                    result.actions.push(pending.action.clone());
                    result
                        .actions
                        .push(self.node(pending.target).hooks.entry.clone());
                    self.composite_mut(id).current = Some(pending.target);
                    result.actions.push(self.node(id).hooks.tick.clone());
                    self.record_transition(&pending);
                } else if pending.remaining > 0 {
                    // Target lies above this level: exit and bubble up.
                    result.actions.push(self.node(current).hooks.exit.clone());
                    self.composite_mut(id).current = None;
                    pending.remaining -= 1;
                    result.pending = Some(pending);
                } else {
                    // Target lies below: fire the action, then enter level
                    // by level from the target's parent chain.
                    result.actions.push(pending.action.clone());
                    let hop = self
                        .node(pending.target)
                        .parent
                        .expect("cross-level target below the root has a parent");
                    self.enter_towards(hop, pending.target, -pending.remaining, &mut result.actions);
                    self.record_transition(&pending);
                }
            }
            None => {
                // Nothing transitioned this tick anywhere below; the
                // composite reports its own per-tick handle.
                result.actions.push(self.node(id).hooks.tick.clone());
            }
        }

        Ok(result)
    }

    /// Scan `current`'s outgoing transitions in declaration order and
    /// snapshot the first whose guard is true. Read-only: the decision is
    /// taken before any mutation so a guard failure leaves the machine
    /// untouched.
    fn scan_transitions(&self, current: NodeId) -> Result<Option<Pending>, TickError> {
        for transition in &self.node(current).transitions {
            let fired = transition
                .is_triggered()
                .map_err(|source| TickError::Guard {
                    state: self.node(current).name.clone(),
                    source,
                })?;
            if fired {
                let remaining =
                    self.node(current).level as i32 - self.node(transition.target).level as i32;
                return Ok(Some(Pending {
                    source: current,
                    target: transition.target,
                    action: transition.action.clone(),
                    remaining,
                }));
            }
        }
        Ok(None)
    }

    /// Downward routing: enter `target` on a composite that is an
    /// ancestor of it.
    ///
    /// Walks upward first (`level` hops) to reach the composite where the
    /// trigger was detected, collecting that walk's actions, then enters
    /// one level locally: exit the active child if any, activate
    /// `target`, emit its entry handle. Unwinding the recursion enters
    /// successive levels, which yields a contiguous top-to-target entry
    /// sequence.
    fn enter_towards(
        &mut self,
        id: NodeId,
        target: NodeId,
        level: i32,
        actions: &mut Vec<ActionHandle>,
    ) {
        if level > 0 {
            let parent = self
                .node(id)
                .parent
                .expect("downward routing never walks past the root");
            self.enter_towards(parent, id, level - 1, actions);
        }
        if let Some(active) = self.composite(id).current {
            actions.push(self.node(active).hooks.exit.clone());
        }
        self.composite_mut(id).current = Some(target);
        actions.push(self.node(target).hooks.entry.clone());
    }

    fn record_transition(&mut self, pending: &Pending) {
        let record = TransitionRecord {
            from: self.node(pending.source).name.clone(),
            to: self.node(pending.target).name.clone(),
            tick: self.ticks,
            timestamp: Utc::now(),
        };
        self.trace = self.trace.record(record);
    }
}

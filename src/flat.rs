//! Single-level state machine variant.
//!
//! No hierarchy and no cross-level routing: one set of sibling states,
//! an optional list of any-state transitions checked before the current
//! state's own, and machine-level entry/exit actions. Shares the
//! [`Condition`] and [`ActionHandle`] types with the hierarchical engine
//! and hands actions back to the host the same way.

use crate::core::{ActionHandle, Condition, StateHooks};
use crate::engine::TickError;

/// Index of a state within one flat machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StateId(usize);

/// A state in a flat machine.
pub struct State {
    name: String,
    hooks: StateHooks,
    transitions: Vec<Transition>,
}

impl State {
    pub fn new(name: impl Into<String>, hooks: StateHooks) -> Self {
        Self {
            name: name.into(),
            hooks,
            transitions: Vec::new(),
        }
    }
}

/// A guarded edge between sibling states. A transition without a target
/// exits the machine instead.
pub struct Transition {
    target: Option<StateId>,
    action: ActionHandle,
    condition: Box<dyn Condition>,
}

impl Transition {
    pub fn new(target: StateId, condition: impl Condition + 'static) -> Self {
        Self {
            target: Some(target),
            action: ActionHandle::none(),
            condition: Box::new(condition),
        }
    }

    /// Transition that exits the whole machine when triggered.
    pub fn exit_machine(condition: impl Condition + 'static) -> Self {
        Self {
            target: None,
            action: ActionHandle::none(),
            condition: Box::new(condition),
        }
    }

    pub fn with_action(mut self, action: ActionHandle) -> Self {
        self.action = action;
        self
    }
}

/// Driver for a single-level state machine.
///
/// The first state added becomes the initial state until
/// [`set_initial`](StateMachine::set_initial) says otherwise.
pub struct StateMachine {
    states: Vec<State>,
    initial: Option<StateId>,
    current: Option<StateId>,
    any_transitions: Vec<Transition>,
    entry_action: ActionHandle,
    exit_action: ActionHandle,
}

impl StateMachine {
    pub fn new(entry_action: ActionHandle, exit_action: ActionHandle) -> Self {
        Self {
            states: Vec::new(),
            initial: None,
            current: None,
            any_transitions: Vec::new(),
            entry_action,
            exit_action,
        }
    }

    pub fn add_state(&mut self, state: State) -> StateId {
        let id = StateId(self.states.len());
        self.states.push(state);
        if self.initial.is_none() {
            self.initial = Some(id);
        }
        id
    }

    pub fn set_initial(&mut self, id: StateId) {
        self.initial = Some(id);
    }

    /// Append to `source`'s ordered transition list; declaration order is
    /// the tie-break.
    pub fn add_transition(&mut self, source: StateId, transition: Transition) {
        self.states[source.0].transitions.push(transition);
    }

    /// Add a transition that can fire from any state, checked before the
    /// current state's own transitions each tick.
    pub fn add_any_transition(&mut self, transition: Transition) {
        self.any_transitions.push(transition);
    }

    pub fn current(&self) -> Option<StateId> {
        self.current
    }

    pub fn name(&self, id: StateId) -> &str {
        &self.states[id.0].name
    }

    /// Advance one tick, returning the ordered actions for the host to
    /// invoke.
    pub fn tick(&mut self) -> Result<Vec<ActionHandle>, TickError> {
        let current = match self.current {
            Some(current) => current,
            None => {
                let initial = self.initial.ok_or_else(|| TickError::MissingInitialChild {
                    state: "state machine".to_string(),
                })?;
                self.current = Some(initial);
                return Ok(vec![
                    self.entry_action.clone(),
                    self.states[initial.0].hooks.entry.clone(),
                ]);
            }
        };

        let trigger = self.scan(current)?;
        Ok(match trigger {
            Some((Some(target), action)) => {
                let actions = vec![
                    self.states[current.0].hooks.exit.clone(),
                    action,
                    self.states[target.0].hooks.entry.clone(),
                ];
                self.current = Some(target);
                actions
            }
            Some((None, _)) => self.exit(),
            None => vec![self.states[current.0].hooks.tick.clone()],
        })
    }

    /// Exit the machine: the current state's exit actions if any, then
    /// the machine's own. The next tick re-enters the initial state.
    pub fn exit(&mut self) -> Vec<ActionHandle> {
        let mut actions = Vec::new();
        if let Some(current) = self.current {
            actions.push(self.states[current.0].hooks.exit.clone());
        }
        self.current = None;
        actions.push(self.exit_action.clone());
        actions
    }

    fn scan(
        &self,
        current: StateId,
    ) -> Result<Option<(Option<StateId>, ActionHandle)>, TickError> {
        let local = self.states[current.0].transitions.iter();
        for transition in self.any_transitions.iter().chain(local) {
            let fired = transition
                .condition
                .test()
                .map_err(|source| TickError::Guard {
                    state: self.states[current.0].name.clone(),
                    source,
                })?;
            if fired {
                return Ok(Some((transition.target, transition.action.clone())));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Latch;
    use crate::Reset;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    fn log() -> Log {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn tracked(log: &Log, label: &str) -> ActionHandle {
        let log = Arc::clone(log);
        let label = label.to_string();
        ActionHandle::from_fn(move || log.lock().unwrap().push(label.clone()))
    }

    fn hooks(log: &Log, name: &str) -> StateHooks {
        StateHooks::none()
            .on_entry(tracked(log, &format!("{name}.entry")))
            .on_tick(tracked(log, &format!("{name}.tick")))
            .on_exit(tracked(log, &format!("{name}.exit")))
    }

    fn run(actions: &[ActionHandle]) {
        for action in actions {
            action.invoke();
        }
    }

    fn drain(log: &Log) -> Vec<String> {
        std::mem::take(&mut *log.lock().unwrap())
    }

    fn two_state_machine(log: &Log) -> (StateMachine, StateId, StateId) {
        let mut machine = StateMachine::new(
            tracked(log, "machine.entry"),
            tracked(log, "machine.exit"),
        );
        let idle = machine.add_state(State::new("Idle", hooks(log, "Idle")));
        let busy = machine.add_state(State::new("Busy", hooks(log, "Busy")));
        (machine, idle, busy)
    }

    #[test]
    fn first_tick_enters_machine_and_initial_state() {
        let log = log();
        let (mut machine, idle, _busy) = two_state_machine(&log);

        run(&machine.tick().unwrap());
        assert_eq!(drain(&log), vec!["machine.entry", "Idle.entry"]);
        assert_eq!(machine.current(), Some(idle));
    }

    #[test]
    fn quiescent_tick_reports_current_state() {
        let log = log();
        let (mut machine, _idle, _busy) = two_state_machine(&log);
        machine.tick().unwrap();
        drain(&log);

        run(&machine.tick().unwrap());
        run(&machine.tick().unwrap());
        assert_eq!(drain(&log), vec!["Idle.tick", "Idle.tick"]);
    }

    #[test]
    fn set_initial_overrides_first_added() {
        let log = log();
        let (mut machine, _idle, busy) = two_state_machine(&log);
        machine.set_initial(busy);

        machine.tick().unwrap();
        assert_eq!(machine.current(), Some(busy));
    }

    #[test]
    fn transition_orders_exit_action_entry() {
        let log = log();
        let (mut machine, idle, busy) = two_state_machine(&log);
        let go = Latch::new();
        machine.add_transition(
            idle,
            Transition::new(busy, go.clone()).with_action(tracked(&log, "t")),
        );

        machine.tick().unwrap();
        drain(&log);

        go.fire();
        run(&machine.tick().unwrap());
        assert_eq!(drain(&log), vec!["Idle.exit", "t", "Busy.entry"]);
        assert_eq!(machine.current(), Some(busy));
    }

    #[test]
    fn any_state_transition_preempts_local_ones() {
        let log = log();
        let (mut machine, idle, busy) = two_state_machine(&log);
        let panic_state = machine.add_state(State::new("Panic", hooks(&log, "Panic")));

        machine.add_transition(idle, Transition::new(busy, || true));
        machine.add_any_transition(Transition::new(panic_state, || true));

        machine.tick().unwrap();
        machine.tick().unwrap();
        assert_eq!(machine.current(), Some(panic_state));
    }

    #[test]
    fn exit_machine_transition_leaves_the_machine() {
        let log = log();
        let (mut machine, idle, _busy) = two_state_machine(&log);
        let done = Latch::new();
        machine.add_transition(idle, Transition::exit_machine(done.clone()));

        machine.tick().unwrap();
        drain(&log);

        done.fire();
        run(&machine.tick().unwrap());
        assert_eq!(drain(&log), vec!["Idle.exit", "machine.exit"]);
        assert_eq!(machine.current(), None);
        done.reset();

        // Next tick re-enters from the initial state.
        run(&machine.tick().unwrap());
        assert_eq!(drain(&log), vec!["machine.entry", "Idle.entry"]);
    }

    #[test]
    fn empty_machine_cannot_be_entered() {
        let mut machine = StateMachine::new(ActionHandle::none(), ActionHandle::none());
        let err = machine.tick().unwrap_err();
        assert!(matches!(err, TickError::MissingInitialChild { .. }));
    }

    #[test]
    fn guard_error_surfaces_with_state_name() {
        let log = log();
        let (mut machine, idle, busy) = two_state_machine(&log);
        machine.add_transition(
            idle,
            Transition::new(
                busy,
                crate::Comparison::fallible(crate::CompareOp::Eq, 0, || {
                    Err(crate::ConditionError::new("sensor offline"))
                }),
            ),
        );

        machine.tick().unwrap();
        let err = machine.tick().unwrap_err();
        assert!(matches!(err, TickError::Guard { ref state, .. } if state == "Idle"));
        assert_eq!(machine.current(), Some(idle));
    }
}

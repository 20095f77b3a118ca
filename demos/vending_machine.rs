//! Vending Machine
//!
//! The single-level machine variant: sibling states, an any-state
//! transition for faults, and an exit-machine transition when the
//! machine is decommissioned.
//!
//! Run with: cargo run --example vending_machine

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use stratum::flat::{State, StateMachine, Transition};
use stratum::{hooks, ActionHandle, CompareOp, Comparison, Latch, Reset};

fn main() {
    let credit = Arc::new(AtomicI64::new(0));
    let fault = Latch::new();
    let decommission = Latch::new();

    let mut machine = StateMachine::new(
        ActionHandle::from_fn(|| println!("  [machine] powered on")),
        ActionHandle::from_fn(|| println!("  [machine] powered off")),
    );

    let idle = machine.add_state(State::new(
        "Idle",
        hooks! {
            entry: || println!("  [idle] waiting for coins"),
            tick: || println!("  [idle] humming"),
        },
    ));
    let vending = machine.add_state(State::new(
        "Vending",
        hooks! {
            entry: || println!("  [vending] dispensing"),
            exit: || println!("  [vending] tray cleared"),
        },
    ));
    let out_of_service = machine.add_state(State::new(
        "OutOfService",
        hooks! {
            entry: || println!("  [fault] flashing error light"),
        },
    ));

    // Enough credit starts a vend; dispensing clears the credit.
    let sampled = Arc::clone(&credit);
    machine.add_transition(
        idle,
        Transition::new(
            vending,
            Comparison::new(CompareOp::Ge, 100, move || sampled.load(Ordering::SeqCst)),
        ),
    );
    let refund = Arc::clone(&credit);
    machine.add_transition(
        vending,
        Transition::new(idle, || true).with_action(ActionHandle::from_fn(move || {
            refund.store(0, Ordering::SeqCst);
            println!("  [vending] change returned");
        })),
    );

    // Faults win over everything, from any state.
    machine.add_any_transition(Transition::new(out_of_service, fault.clone()));
    machine.add_any_transition(Transition::exit_machine(decommission.clone()));

    for tick in 1..=7 {
        println!("tick {tick}:");

        if tick == 2 {
            credit.store(150, Ordering::SeqCst);
            println!("  [world] coins inserted: 150");
        }
        if tick == 5 {
            fault.fire();
            println!("  [world] coin jam detected");
        }
        if tick == 7 {
            fault.reset();
            decommission.fire();
            println!("  [world] decommission order received");
        }

        let actions = machine.tick().unwrap();
        for action in &actions {
            action.invoke();
        }

        match machine.current() {
            Some(id) => println!("  current: {}", machine.name(id)),
            None => println!("  current: <exited>"),
        }
    }
}

//! Patrol Guard
//!
//! A small game-AI style machine: a guard patrols between two waypoints
//! until an external "spotted" signal fires, then chases, and gives up
//! once the target gets far enough away.
//!
//! Key concepts:
//! - Composite state (Patrol) with its own nested machine
//! - Latch condition fired by the host, reset on exit
//! - Comparison condition sampling host state fresh every tick
//! - The host loop invoking the returned action handles in order
//!
//! Run with: cargo run --example patrol_guard

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use stratum::{hooks, CompareOp, Comparison, HsmBuilder, Latch, Reset, Transition};

fn main() {
    let spotted = Latch::new();
    let distance = Arc::new(AtomicI64::new(0));

    let mut builder = HsmBuilder::new();
    let root = builder.composite("Guard", hooks!());
    let patrol = builder
        .composite_in(root, "Patrol", hooks! {
            entry: || println!("  [patrol] resuming route"),
        })
        .unwrap();
    let chase = builder
        .leaf_in(root, "Chase", hooks! {
            entry: || println!("  [chase] target spotted, pursuing"),
            tick: || println!("  [chase] closing in"),
            exit: || println!("  [chase] breaking off"),
        })
        .unwrap();

    let point_a = builder
        .leaf_in(patrol, "PointA", hooks! {
            entry: || println!("  [patrol] heading to point A"),
            tick: || println!("  [patrol] walking toward A"),
        })
        .unwrap();
    let point_b = builder
        .leaf_in(patrol, "PointB", hooks! {
            entry: || println!("  [patrol] heading to point B"),
            tick: || println!("  [patrol] walking toward B"),
        })
        .unwrap();

    // Ping-pong between the waypoints every other tick.
    let steps = Arc::new(AtomicI64::new(0));
    let counter = Arc::clone(&steps);
    builder.add_transition(
        point_a,
        Transition::new(point_b, move || {
            counter.fetch_add(1, Ordering::SeqCst) % 2 == 1
        }),
    );
    let counter = Arc::clone(&steps);
    builder.add_transition(
        point_b,
        Transition::new(point_a, move || {
            counter.fetch_add(1, Ordering::SeqCst) % 2 == 1
        }),
    );

    // Outer edges: Patrol -> Chase on the latch, Chase -> Patrol once the
    // target is more than 50 units away.
    builder.add_transition(
        patrol,
        Transition::new(chase, spotted.clone())
            .with_action(stratum::ActionHandle::from_fn(|| {
                println!("  [alarm] guard shouts!")
            })),
    );
    let sampled = Arc::clone(&distance);
    builder.add_transition(
        chase,
        Transition::new(
            patrol,
            Comparison::new(CompareOp::Gt, 50, move || sampled.load(Ordering::SeqCst)),
        ),
    );

    let mut machine = builder.build(root).unwrap();

    for tick in 1..=10 {
        println!("tick {tick}:");

        // Host-side world updates.
        if tick == 4 {
            spotted.fire();
            println!("  [world] intruder seen");
        }
        if tick == 7 {
            distance.store(80, Ordering::SeqCst);
            println!("  [world] intruder escaped to distance 80");
        }

        let actions = machine.tick().unwrap();
        for action in &actions {
            action.invoke();
        }

        // The engine never resets latches; the host does, once the edge
        // out of Patrol has been consumed.
        let names: Vec<&str> = machine
            .active_chain()
            .into_iter()
            .map(|id| machine.name(id))
            .collect();
        if names.contains(&"Chase") {
            spotted.reset();
        }
        println!("  active: {}", names.join(" / "));
    }

    println!("\ntransitions taken:");
    for record in machine.trace().records() {
        println!("  tick {:>2}: {} -> {}", record.tick, record.from, record.to);
    }
}

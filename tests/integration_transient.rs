//! Integration tests for transient behaviour of whole circuits.
//!
//! Every circuit is built from DSL text or the built-in library and run
//! through the public simulator API at the default 20 ms tick.

use std::time::{Duration, Instant};

use mosfet_sim::circuits;
use mosfet_sim::components::ekv_nmos;
use mosfet_sim::dsl;
use mosfet_sim::worker::{DriveState, FeatureFlags, Request, SimWorker, SnapshotInbox};
use mosfet_sim::{Circuit, Simulator, SimulatorConfig};

// ===========================================================================
// Helpers
// ===========================================================================

fn simulator(source: &str) -> Simulator {
    let ast = dsl::parse(source).unwrap();
    Simulator::new(Circuit::from_ast(ast).unwrap())
}

fn builtin(key: &str, pins: &[(&str, f64)]) -> Simulator {
    let mut sim = Simulator::new(circuits::load(key).unwrap());
    for &(node, voltage) in pins {
        sim.pin(node, voltage).unwrap();
    }
    sim
}

fn settle(sim: &mut Simulator) -> f64 {
    sim.run(500);
    sim.node_voltage("out").unwrap()
}

// ===========================================================================
// Single transistor discharge
// ===========================================================================

#[test]
fn nmos_drain_discharges_monotonically() {
    let mut sim = simulator(
        "\
.node gate  2 input
.node drain 5
MN1 gate gnd drain gnd NMOS
",
    );

    let mut previous = sim.node_voltage("drain").unwrap();
    for tick in 0..500 {
        sim.step();
        let vd = sim.node_voltage("drain").unwrap();
        assert!(vd <= previous, "drain rose at tick {tick}: {previous} -> {vd}");
        assert!(previous - vd <= 0.1 + 1e-12, "step larger than clamp at tick {tick}");
        previous = vd;
    }

    assert!(previous >= 0.0);
    assert!(previous < 0.01, "drain did not discharge: {previous}");
    assert!(ekv_nmos(2.0, 0.0, previous, 0.0).current.abs() < 1e-7);
    assert_eq!(sim.node_voltage("gate"), Some(2.0));
}

#[test]
fn nmos_below_threshold_barely_conducts() {
    let mut sim = simulator(
        "\
.node gate  0 input
.node drain 5
MN1 gate gnd drain gnd NMOS
",
    );
    sim.run(500);
    assert!(sim.node_voltage("drain").unwrap() > 4.9);
}

// ===========================================================================
// Logic gates
// ===========================================================================

#[test]
fn inverter_transfer() {
    assert!(settle(&mut builtin("inverter", &[("in", 0.0)])) > 4.9);
    assert!(settle(&mut builtin("inverter", &[("in", 5.0)])) < 0.1);
}

#[test]
fn nand_truth_table() {
    for (a, b, high) in [
        (0.0, 0.0, true),
        (0.0, 5.0, true),
        (5.0, 0.0, true),
        (5.0, 5.0, false),
    ] {
        let out = settle(&mut builtin("nand", &[("a", a), ("b", b)]));
        if high {
            assert!(out > 4.5, "nand({a}, {b}) = {out}");
        } else {
            assert!(out < 0.5, "nand({a}, {b}) = {out}");
        }
    }
}

#[test]
fn nor_truth_table() {
    for (a, b, high) in [
        (0.0, 0.0, true),
        (0.0, 5.0, false),
        (5.0, 0.0, false),
        (5.0, 5.0, false),
    ] {
        let out = settle(&mut builtin("nor", &[("a", a), ("b", b)]));
        if high {
            assert!(out > 4.5, "nor({a}, {b}) = {out}");
        } else {
            assert!(out < 0.5, "nor({a}, {b}) = {out}");
        }
    }
}

// ===========================================================================
// Rails and pinned nodes
// ===========================================================================

#[test]
fn rails_hold_in_every_builtin() {
    for key in circuits::keys() {
        let mut sim = Simulator::with_config(
            circuits::load(key).unwrap(),
            SimulatorConfig::new().with_early_effect(true),
        )
        .unwrap();
        for _ in 0..200 {
            sim.step();
            assert_eq!(sim.node_voltage("gnd"), Some(0.0), "{key}");
            assert_eq!(sim.node_voltage("vdd"), Some(5.0), "{key}");
            for (name, v) in sim.voltages() {
                assert!(v.is_finite(), "{key}: node {name} diverged");
            }
        }
    }
}

#[test]
fn drag_holds_node_then_releases() {
    let mut sim = builtin("inverter", &[("in", 0.0)]);

    sim.pin("out", 2.5).unwrap();
    sim.run(5);
    assert_eq!(sim.node_voltage("out"), Some(2.5));

    sim.release("out").unwrap();
    sim.run(200);
    assert!(sim.node_voltage("out").unwrap() > 4.9);
}

#[test]
fn released_input_stays_put() {
    let mut sim = builtin("inverter", &[("in", 3.3)]);
    sim.release("in").unwrap();
    sim.run(50);
    assert_eq!(sim.node_voltage("in"), Some(3.3));
}

#[test]
fn rails_cannot_be_dragged() {
    let mut sim = builtin("inverter", &[]);
    assert!(sim.pin("vdd", 3.0).is_err());
    assert!(sim.pin("GND", 1.0).is_err());
    assert!(sim.release("0").is_err());
}

#[test]
fn non_finite_drag_leaves_circuit_healthy() {
    let mut sim = builtin("inverter", &[("in", 0.0)]);
    assert!(sim.pin("in", f64::NAN).is_err());
    assert!(sim.set_node_voltage("out", f64::INFINITY).is_err());
    sim.run(1);

    sim.pin("in", 5.0).unwrap();
    let out = settle(&mut sim);
    assert!(out.is_finite());
    assert!(out < 0.1);
}

#[test]
fn negative_timestep_is_refused() {
    let mut sim = builtin("inverter", &[("in", 5.0)]);
    assert!(sim.step_by(-20.0).is_err());
    assert_eq!(sim.node_voltage("out"), Some(5.0));
    assert_eq!(sim.ticks(), 0);

    for _ in 0..100 {
        sim.step_by(20.0).unwrap();
        assert!(sim.node_voltage("out").unwrap() <= 5.0);
    }
}

// ===========================================================================
// Worker round trip
// ===========================================================================

#[test]
fn worker_snapshots_follow_selected_circuit() {
    let worker = SimWorker::spawn(SimulatorConfig::new().with_timestep_ms(1.0)).unwrap();
    let mut inbox = SnapshotInbox::for_circuit("inverter");

    worker
        .post(&Request::new(
            "inverter",
            DriveState::new().with_pin("in", 5.0),
            FeatureFlags::default(),
        ))
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(20);
    let mut falling = false;
    while Instant::now() < deadline && !falling {
        if let Some(text) = worker.recv_timeout(Duration::from_millis(100)).unwrap() {
            inbox.accept(&text).unwrap();
        }
        falling = inbox
            .latest()
            .is_some_and(|s| s.voltages["out"] < 4.0);
    }
    assert!(falling, "inverter output never started falling");

    inbox.select("nand");
    worker
        .post(&Request::new(
            "nand",
            DriveState::new(),
            FeatureFlags::default(),
        ))
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(20);
    while Instant::now() < deadline && inbox.latest().is_none() {
        if let Some(text) = worker.recv_timeout(Duration::from_millis(100)).unwrap() {
            inbox.accept(&text).unwrap();
        }
    }
    let snapshot = inbox.latest().unwrap();
    assert_eq!(snapshot.circuit, "nand");
    assert!(snapshot.voltages.contains_key("mid"));
}

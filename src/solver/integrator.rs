//! Explicit charge integrator.
//!
//! One tick advances every free node by `ΔV = I·Δt / C`, where `I` is the
//! net device current into the node evaluated on the voltages at the start of
//! the tick. `ΔV` is clamped per tick, and the node's capacitance is adapted
//! beforehand to damp ringing (see [`super::bounce`]).

use crate::circuit::{Circuit, Node, NodeId};
use crate::{GROUND_VOLTAGE, SUPPLY_VOLTAGE};

use super::bounce::adapt_capacitance;
use super::MAX_VOLTAGE_STEP;

/// Per-tick integration settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegratorOptions {
    /// Largest voltage change a node may make in one tick (V).
    pub max_step: f64,
    /// Include channel-length modulation in device currents.
    pub early_effect: bool,
}

impl Default for IntegratorOptions {
    fn default() -> Self {
        Self {
            max_step: MAX_VOLTAGE_STEP,
            early_effect: false,
        }
    }
}

/// Advance the circuit by `dt_ms` milliseconds with default options.
pub fn tick(circuit: &mut Circuit, dt_ms: f64) {
    tick_with(circuit, dt_ms, IntegratorOptions::default());
}

/// Advance the circuit by `dt_ms` milliseconds.
pub fn tick_with(circuit: &mut Circuit, dt_ms: f64, options: IntegratorOptions) {
    for node in &mut circuit.nodes {
        node.clear_current();
    }

    accumulate_device_currents(circuit, options.early_effect);

    for (idx, node) in circuit.nodes.iter_mut().enumerate() {
        match NodeId(idx) {
            NodeId::GROUND => node.voltage = GROUND_VOLTAGE,
            NodeId::SUPPLY => node.voltage = SUPPLY_VOLTAGE,
            _ if node.fixed => {}
            _ => {
                integrate_node(node, dt_ms, options.max_step);
            }
        }
    }
}

/// Evaluate every device and sum its current into its source and drain.
///
/// Node voltages are only read here, so every device sees the same
/// start-of-tick snapshot.
fn accumulate_device_currents(circuit: &mut Circuit, early_effect: bool) {
    let nodes = &mut circuit.nodes;
    for device in &mut circuit.devices {
        let output = device.evaluate(nodes, early_effect);
        device.record(output);

        let into_drain = device.mosfet_type().drain_sign() * output.current;
        nodes[device.drain().0].add_current(into_drain);
        nodes[device.source().0].add_current(-into_drain);
    }
}

/// Integrate a single free node over `dt_ms` using its accumulated current.
///
/// Returns the voltage change that was applied.
pub fn integrate_node(node: &mut Node, dt_ms: f64, max_step: f64) -> f64 {
    adapt_capacitance(node);

    let dt = dt_ms * 1e-3;
    let delta = (node.net_current() / node.capacitance() * dt).clamp(-max_step, max_step);

    node.voltage += delta;
    node.push_history(node.voltage);
    delta
}

//! Circuit validation.

use log::warn;

use crate::error::{Result, SimError};

use super::{Circuit, NodeId};

/// Validate a circuit for simulation.
///
/// Checks:
/// - The circuit has at least one device
/// - Every free node is touched by at least one device terminal
///
/// Dangling terminal references cannot reach this point; the builder
/// rejects them when the device is added.
pub fn validate_circuit(circuit: &Circuit) -> Result<()> {
    if circuit.devices().is_empty() {
        return Err(SimError::InvalidTopology {
            message: "Circuit has no devices".to_string(),
        });
    }

    let mut connected = vec![false; circuit.num_nodes()];
    for device in circuit.devices() {
        for terminal in device.terminals() {
            connected[terminal.0] = true;
        }
    }

    for (idx, node) in circuit.nodes().iter().enumerate() {
        if NodeId(idx).is_rail() || connected[idx] {
            continue;
        }
        // An isolated net never changes, which is harmless but usually a typo
        warn!("node '{}' is not connected to any device", node.name);
    }

    Ok(())
}

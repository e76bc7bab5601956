//! Oscillation ("bounce") detection and adaptive capacitance.
//!
//! Forward Euler on a node whose effective time constant is shorter than
//! the timestep rings: the voltage overshoots, the current reverses, and the
//! trace zig-zags. Each tick the node's recent history is scanned for
//! direction reversals. A ringing node gets a large capacitance boost that
//! slows it down; a node with a monotonic trace relaxes back toward its
//! baseline so legitimate changes stay responsive.

use log::trace;

use crate::circuit::Node;

/// Capacitance change per tick, as a multiple of the node's baseline.
pub const CAPACITANCE_STEP_FACTOR: f64 = 10.0;

/// Count direction reversals in a voltage trace (oldest first).
///
/// Pairs with a zero delta carry no direction and are skipped. The first
/// comparison only establishes the starting direction.
pub fn count_reversals(history: impl IntoIterator<Item = f64>) -> usize {
    let mut reversals = 0;
    let mut previous: Option<f64> = None;
    let mut direction: Option<bool> = None;

    for (idx, voltage) in history.into_iter().enumerate() {
        let Some(last) = previous.replace(voltage) else {
            continue;
        };

        let delta = voltage - last;
        let increasing = if delta > 0.0 {
            true
        } else if delta < 0.0 {
            false
        } else {
            continue;
        };

        if idx > 1 && direction.is_some_and(|d| d != increasing) {
            reversals += 1;
        }
        direction = Some(increasing);
    }

    reversals
}

/// Inflate or relax a node's capacitance based on its history.
///
/// Returns the number of reversals found.
pub fn adapt_capacitance(node: &mut Node) -> usize {
    let reversals = count_reversals(node.history());
    let step = CAPACITANCE_STEP_FACTOR * node.original_capacitance();

    if reversals > 0 {
        trace!(
            "node '{}' bouncing ({} reversals), capacitance {:.3e} -> {:.3e}",
            node.name,
            reversals,
            node.capacitance(),
            node.capacitance() + step
        );
        node.set_capacitance(node.capacitance() + step);
    } else {
        node.set_capacitance(node.capacitance() - step);
    }

    reversals
}

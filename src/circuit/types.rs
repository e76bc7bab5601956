//! Core types for circuit representation.

use std::collections::VecDeque;
use std::fmt;

/// Number of integrated voltages each node remembers for bounce detection.
pub const HISTORY_LEN: usize = 10;

/// Capacitance of an ordinary signal node (F).
pub const SIGNAL_CAPACITANCE: f64 = 5e-5;

/// Capacitance of a node in the supply class (F).
pub const SUPPLY_CAPACITANCE: f64 = 5e-4;

/// A unique identifier for a node in the circuit.
/// Node 0 is always ground and node 1 is always the supply rail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The ground rail (always index 0).
    pub const GROUND: NodeId = NodeId(0);

    /// The supply rail (always index 1).
    pub const SUPPLY: NodeId = NodeId(1);

    /// Check if this is the ground node.
    pub fn is_ground(&self) -> bool {
        *self == Self::GROUND
    }

    /// Check if this is the supply node.
    pub fn is_supply(&self) -> bool {
        *self == Self::SUPPLY
    }

    /// Check if this is either rail.
    pub fn is_rail(&self) -> bool {
        self.is_ground() || self.is_supply()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::GROUND => write!(f, "GND"),
            Self::SUPPLY => write!(f, "VDD"),
            _ => write!(f, "N{}", self.0),
        }
    }
}

/// A unique identifier for a device in the circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(pub usize);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M{}", self.0)
    }
}

/// Capacitance class chosen when a node is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeClass {
    #[default]
    Signal,
    Supply,
}

impl NodeClass {
    /// Baseline capacitance for this class (F).
    pub fn capacitance(&self) -> f64 {
        match self {
            NodeClass::Signal => SIGNAL_CAPACITANCE,
            NodeClass::Supply => SUPPLY_CAPACITANCE,
        }
    }
}

/// A circuit net.
///
/// The capacitance adapts while the simulation runs but never drops below
/// the value the node was created with.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    /// Node voltage (V)
    pub voltage: f64,
    /// Excluded from integration while set
    pub fixed: bool,
    net_current: f64,
    capacitance: f64,
    original_capacitance: f64,
    /// Declared as externally driven; `fixed` returns here on release
    driven: bool,
    history: VecDeque<f64>,
}

impl Node {
    /// Create a free node of the given capacitance class.
    pub fn new(name: impl Into<String>, voltage: f64, class: NodeClass) -> Self {
        Self::with_capacitance(name, voltage, class.capacitance())
    }

    /// Create a free node with an explicit baseline capacitance.
    pub fn with_capacitance(name: impl Into<String>, voltage: f64, capacitance: f64) -> Self {
        Self {
            name: name.into(),
            voltage,
            fixed: false,
            net_current: 0.0,
            capacitance,
            original_capacitance: capacitance,
            driven: false,
            history: std::iter::repeat(voltage).take(HISTORY_LEN).collect(),
        }
    }

    /// Mark the node as externally driven. Driven nodes start fixed.
    pub fn driven(mut self) -> Self {
        self.driven = true;
        self.fixed = true;
        self
    }

    /// Whether the node was declared as externally driven.
    pub fn is_driven(&self) -> bool {
        self.driven
    }

    /// Net current summed into the node on the last tick (A).
    pub fn net_current(&self) -> f64 {
        self.net_current
    }

    /// Current effective capacitance (F).
    pub fn capacitance(&self) -> f64 {
        self.capacitance
    }

    /// Baseline capacitance the node was created with (F).
    pub fn original_capacitance(&self) -> f64 {
        self.original_capacitance
    }

    /// Recent integrated voltages, oldest first.
    pub fn history(&self) -> impl Iterator<Item = f64> + '_ {
        self.history.iter().copied()
    }

    /// Most recent integrated voltage.
    pub fn last_sample(&self) -> Option<f64> {
        self.history.back().copied()
    }

    /// Replace the history trace.
    ///
    /// Only the newest [`HISTORY_LEN`] samples are kept. A shorter trace is
    /// padded at the front with its oldest sample, or with the present
    /// voltage when `samples` is empty.
    pub fn seed_history(&mut self, samples: &[f64]) {
        let tail = &samples[samples.len().saturating_sub(HISTORY_LEN)..];
        let pad = tail.first().copied().unwrap_or(self.voltage);
        self.history.clear();
        self.history
            .extend(std::iter::repeat(pad).take(HISTORY_LEN - tail.len()));
        self.history.extend(tail.iter().copied());
    }

    /// Drive the node to `voltage` and hold it there.
    pub fn pin(&mut self, voltage: f64) {
        self.voltage = voltage;
        self.fixed = true;
    }

    /// Stop holding the node.
    ///
    /// Driven nodes stay fixed. A node that becomes free again starts from a
    /// flat history so the jump made while it was held is not read as ringing.
    pub fn release(&mut self) {
        self.fixed = self.driven;
        if !self.fixed {
            self.seed_history(&[]);
        }
    }

    pub(crate) fn clear_current(&mut self) {
        self.net_current = 0.0;
    }

    pub(crate) fn add_current(&mut self, current: f64) {
        self.net_current += current;
    }

    /// Set the effective capacitance, floored at the baseline.
    pub(crate) fn set_capacitance(&mut self, capacitance: f64) {
        self.capacitance = capacitance.max(self.original_capacitance);
    }

    pub(crate) fn push_history(&mut self, voltage: f64) {
        if self.history.len() == HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(voltage);
    }

    #[cfg(test)]
    pub(crate) fn set_net_current(&mut self, current: f64) {
        self.net_current = current;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_starts_flat() {
        let node = Node::new("out", 2.5, NodeClass::Signal);
        let history: Vec<f64> = node.history().collect();
        assert_eq!(history, vec![2.5; HISTORY_LEN]);
    }

    #[test]
    fn test_history_is_fixed_length_fifo() {
        let mut node = Node::new("out", 0.0, NodeClass::Signal);
        for i in 1..=12 {
            node.push_history(i as f64);
        }
        let history: Vec<f64> = node.history().collect();
        assert_eq!(history, (3..=12).map(|i| i as f64).collect::<Vec<_>>());
        assert_eq!(node.last_sample(), Some(12.0));
    }

    #[test]
    fn test_seed_history_pads_short_traces() {
        let mut node = Node::new("out", 1.0, NodeClass::Signal);
        node.seed_history(&[0.3, 0.4]);
        let history: Vec<f64> = node.history().collect();
        assert_eq!(history.len(), HISTORY_LEN);
        assert_eq!(&history[..8], &[0.3; 8]);
        assert_eq!(&history[8..], &[0.3, 0.4]);
    }

    #[test]
    fn test_capacitance_floor() {
        let mut node = Node::new("out", 0.0, NodeClass::Supply);
        node.set_capacitance(0.0);
        assert_eq!(node.capacitance(), SUPPLY_CAPACITANCE);
        node.set_capacitance(3.0 * SUPPLY_CAPACITANCE);
        assert_eq!(node.capacitance(), 3.0 * SUPPLY_CAPACITANCE);
    }

    #[test]
    fn test_pin_and_release() {
        let mut free = Node::new("mid", 1.0, NodeClass::Signal);
        free.pin(4.0);
        assert!(free.fixed);
        assert_eq!(free.voltage, 4.0);
        free.release();
        assert!(!free.fixed);
        assert!(free.history().all(|v| v == 4.0));

        let mut input = Node::new("in", 0.0, NodeClass::Signal).driven();
        assert!(input.fixed);
        input.pin(3.0);
        input.release();
        assert!(input.fixed);
        assert_eq!(input.voltage, 3.0);
    }

    #[test]
    fn test_rail_ids() {
        assert!(NodeId::GROUND.is_rail());
        assert!(NodeId::SUPPLY.is_supply());
        assert!(!NodeId(2).is_rail());
        assert_eq!(NodeId::SUPPLY.to_string(), "VDD");
        assert_eq!(NodeId(4).to_string(), "N4");
    }
}

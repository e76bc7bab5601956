//! Four-terminal MOSFET device.

use super::ekv::{self, EkvOutput, TerminalVoltages};
use crate::circuit::{DeviceId, Node, NodeId};
use crate::dsl::DeviceType;

/// MOSFET polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MosfetType {
    Nmos,
    Pmos,
}

impl MosfetType {
    /// Sign applied to the device current when it is summed into the drain node.
    ///
    /// A positive NMOS current leaves the drain; a positive PMOS current enters it.
    pub fn drain_sign(&self) -> f64 {
        match self {
            MosfetType::Nmos => -1.0,
            MosfetType::Pmos => 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MosfetType::Nmos => "NMOS",
            MosfetType::Pmos => "PMOS",
        }
    }
}

impl From<DeviceType> for MosfetType {
    fn from(device_type: DeviceType) -> Self {
        match device_type {
            DeviceType::Nmos => MosfetType::Nmos,
            DeviceType::Pmos => MosfetType::Pmos,
        }
    }
}

impl std::fmt::Display for MosfetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A MOSFET component.
///
/// Terminals are node ids into the owning circuit's node arena. The cached
/// outputs hold the values computed on the most recent tick.
#[derive(Debug, Clone)]
pub struct Mosfet {
    pub id: DeviceId,
    pub name: String,
    mosfet_type: MosfetType,
    terminals: [NodeId; 4], // [gate, source, drain, body]
    output: EkvOutput,
}

impl Mosfet {
    /// Create a new MOSFET.
    pub fn new(id: DeviceId, name: String, mosfet_type: MosfetType, terminals: [NodeId; 4]) -> Self {
        Self {
            id,
            name,
            mosfet_type,
            terminals,
            output: EkvOutput::default(),
        }
    }

    /// Device polarity.
    pub fn mosfet_type(&self) -> MosfetType {
        self.mosfet_type
    }

    /// All terminals in gate, source, drain, body order.
    pub fn terminals(&self) -> [NodeId; 4] {
        self.terminals
    }

    /// Get the gate node.
    pub fn gate(&self) -> NodeId {
        self.terminals[0]
    }

    /// Get the source node.
    pub fn source(&self) -> NodeId {
        self.terminals[1]
    }

    /// Get the drain node.
    pub fn drain(&self) -> NodeId {
        self.terminals[2]
    }

    /// Get the body node.
    pub fn body(&self) -> NodeId {
        self.terminals[3]
    }

    /// Read the terminal voltages from the node arena.
    pub fn terminal_voltages(&self, nodes: &[Node]) -> TerminalVoltages {
        TerminalVoltages::new(
            nodes[self.gate().0].voltage,
            nodes[self.source().0].voltage,
            nodes[self.drain().0].voltage,
            nodes[self.body().0].voltage,
        )
    }

    /// Evaluate the device model against the current node voltages.
    pub fn evaluate(&self, nodes: &[Node], early_effect: bool) -> EkvOutput {
        ekv::evaluate(self.mosfet_type, self.terminal_voltages(nodes), early_effect)
    }

    /// Net channel current from the last tick (A).
    pub fn current(&self) -> f64 {
        self.output.current
    }

    /// Forward current component from the last tick (A).
    pub fn forward_current(&self) -> f64 {
        self.output.forward_current
    }

    /// Saturation level from the last tick.
    pub fn saturation_level(&self) -> f64 {
        self.output.saturation_level
    }

    pub(crate) fn record(&mut self, output: EkvOutput) {
        self.output = output;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::NodeClass;

    fn nodes(gate: f64, source: f64, drain: f64) -> Vec<Node> {
        vec![
            Node::new("gnd", 0.0, NodeClass::Supply),
            Node::new("g", gate, NodeClass::Signal),
            Node::new("s", source, NodeClass::Signal),
            Node::new("d", drain, NodeClass::Signal),
        ]
    }

    #[test]
    fn test_terminal_accessors() {
        let m = Mosfet::new(
            DeviceId(0),
            "MN1".to_string(),
            MosfetType::Nmos,
            [NodeId(1), NodeId(2), NodeId(3), NodeId(0)],
        );
        assert_eq!(m.gate(), NodeId(1));
        assert_eq!(m.source(), NodeId(2));
        assert_eq!(m.drain(), NodeId(3));
        assert_eq!(m.body(), NodeId::GROUND);
        assert_eq!(m.mosfet_type().to_string(), "NMOS");
    }

    #[test]
    fn test_evaluate_reads_node_voltages() {
        let m = Mosfet::new(
            DeviceId(0),
            "MN1".to_string(),
            MosfetType::Nmos,
            [NodeId(1), NodeId(2), NodeId(3), NodeId(0)],
        );
        let out = m.evaluate(&nodes(2.0, 0.0, 3.0), false);
        let expected = ekv::ekv_nmos(2.0, 0.0, 3.0, 0.0);
        assert_eq!(out, expected);
        assert!(out.current > 0.0);
    }

    #[test]
    fn test_drain_sign() {
        assert_eq!(MosfetType::Nmos.drain_sign(), -1.0);
        assert_eq!(MosfetType::Pmos.drain_sign(), 1.0);
        assert_eq!(MosfetType::from(DeviceType::Pmos), MosfetType::Pmos);
    }
}

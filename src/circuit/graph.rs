//! Circuit graph structure.
//!
//! Nodes and devices live in two arenas owned by [`Circuit`]. Devices refer
//! to their terminals by [`NodeId`], so any number of devices can share a
//! node without shared ownership.

use std::collections::{BTreeMap, HashMap};

use log::debug;

use super::types::{DeviceId, Node, NodeClass, NodeId};
use crate::components::{Mosfet, MosfetType};
use crate::dsl::CircuitAst;
use crate::error::{Result, SimError};
use crate::{GROUND_VOLTAGE, SUPPLY_VOLTAGE};

/// Names that resolve to the ground rail.
pub const GROUND_ALIASES: [&str; 3] = ["gnd", "GND", "0"];

/// Names that resolve to the supply rail.
pub const SUPPLY_ALIASES: [&str; 2] = ["vdd", "VDD"];

/// A complete circuit ready for simulation.
///
/// The topology is fixed once built; only node voltages, node flags and the
/// cached device outputs change afterwards.
#[derive(Debug, Clone)]
pub struct Circuit {
    /// Optional title from the circuit description
    pub title: Option<String>,

    /// Node arena, indexed by `NodeId`
    pub(crate) nodes: Vec<Node>,

    /// Device arena, indexed by `DeviceId`
    pub(crate) devices: Vec<Mosfet>,

    /// Mapping from node names (and rail aliases) to node IDs
    node_map: HashMap<String, NodeId>,

    /// Mapping from device names to device IDs
    device_map: HashMap<String, DeviceId>,
}

impl Circuit {
    /// Build a circuit from a parsed AST.
    pub fn from_ast(ast: CircuitAst) -> Result<Self> {
        let mut builder = CircuitBuilder::new();
        builder.title = ast.title;

        for def in &ast.nodes {
            let class = if def.supply {
                NodeClass::Supply
            } else {
                NodeClass::Signal
            };
            if def.input {
                builder.add_input(&def.name, def.voltage, class)?;
            } else {
                builder.add_node(&def.name, def.voltage, class)?;
            }
        }

        for def in &ast.devices {
            let terminals = [def.gate(), def.source(), def.drain(), def.body()];
            builder.add_device(&def.name, def.device_type.into(), terminals)?;
        }

        Ok(builder.build())
    }

    /// All nodes, indexed by `NodeId`.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All devices, indexed by `DeviceId`.
    pub fn devices(&self) -> &[Mosfet] {
        &self.devices
    }

    /// Number of nodes (including both rails).
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of devices.
    pub fn num_devices(&self) -> usize {
        self.devices.len()
    }

    /// Get a node by ID.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Get a mutable node by ID.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Get a device by ID.
    pub fn device(&self, id: DeviceId) -> &Mosfet {
        &self.devices[id.0]
    }

    /// Find a node ID by name.
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.node_map.get(name).copied()
    }

    /// Find a device ID by name.
    pub fn find_device(&self, name: &str) -> Option<DeviceId> {
        self.device_map.get(name).copied()
    }

    /// Get the name of a node.
    pub fn node_name(&self, node: NodeId) -> &str {
        &self.nodes[node.0].name
    }

    /// Voltage of a node by name.
    pub fn node_voltage(&self, name: &str) -> Option<f64> {
        self.find_node(name).map(|id| self.nodes[id.0].voltage)
    }

    /// Snapshot of every node voltage, keyed by canonical node name.
    pub fn voltages(&self) -> BTreeMap<String, f64> {
        self.nodes
            .iter()
            .map(|node| (node.name.clone(), node.voltage))
            .collect()
    }

    /// Resolve a node that may be written from outside the simulation.
    fn resolve_free(&self, name: &str) -> Result<NodeId> {
        let id = self.find_node(name).ok_or_else(|| SimError::NodeNotFound {
            node: name.to_string(),
        })?;
        if id.is_rail() {
            return Err(SimError::ReservedNode {
                name: name.to_string(),
            });
        }
        Ok(id)
    }

    /// Reject voltages that would poison every connected node.
    fn check_voltage(name: &str, voltage: f64) -> Result<()> {
        if voltage.is_finite() {
            Ok(())
        } else {
            Err(SimError::invalid_param(format!(
                "node '{}' cannot be driven to {}",
                name, voltage
            )))
        }
    }

    /// Drive a node to `voltage` and hold it (a drag in progress).
    pub fn pin(&mut self, name: &str, voltage: f64) -> Result<()> {
        let id = self.resolve_free(name)?;
        Self::check_voltage(name, voltage)?;
        self.nodes[id.0].pin(voltage);
        Ok(())
    }

    /// Move a node to `voltage` without changing whether it is held.
    ///
    /// The history restarts flat at the new voltage.
    pub fn set_voltage(&mut self, name: &str, voltage: f64) -> Result<()> {
        let id = self.resolve_free(name)?;
        Self::check_voltage(name, voltage)?;
        let node = &mut self.nodes[id.0];
        node.voltage = voltage;
        node.seed_history(&[]);
        Ok(())
    }

    /// Stop holding a node (the drag ended).
    pub fn release(&mut self, name: &str) -> Result<()> {
        let id = self.resolve_free(name)?;
        self.nodes[id.0].release();
        Ok(())
    }

    /// Apply a complete set of externally pinned nodes.
    ///
    /// Every listed node is pinned to its voltage. Held nodes that are not
    /// listed are released. Names are checked before anything is written, so a
    /// bad set leaves the circuit untouched.
    pub fn apply_drive(&mut self, pinned: &BTreeMap<String, f64>) -> Result<()> {
        let resolved = pinned
            .iter()
            .map(|(name, &voltage)| {
                let id = self.resolve_free(name)?;
                Self::check_voltage(name, voltage)?;
                Ok((id, voltage))
            })
            .collect::<Result<HashMap<NodeId, f64>>>()?;

        for (idx, node) in self.nodes.iter_mut().enumerate() {
            let id = NodeId(idx);
            if id.is_rail() {
                continue;
            }
            match resolved.get(&id) {
                Some(&voltage) => node.pin(voltage),
                None if node.fixed && !node.is_driven() => node.release(),
                None => {}
            }
        }
        Ok(())
    }
}

/// Incremental construction of a [`Circuit`].
///
/// Both rails are present from the start. Every name is checked as it is
/// added, so a device can never reference a node that does not exist.
#[derive(Debug)]
pub struct CircuitBuilder {
    title: Option<String>,
    nodes: Vec<Node>,
    node_map: HashMap<String, NodeId>,
    devices: Vec<Mosfet>,
    device_map: HashMap<String, DeviceId>,
}

impl Default for CircuitBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CircuitBuilder {
    /// Create a builder holding only the ground and supply rails.
    pub fn new() -> Self {
        let ground = Node::new(GROUND_ALIASES[0], GROUND_VOLTAGE, NodeClass::Supply).driven();
        let supply = Node::new(SUPPLY_ALIASES[0], SUPPLY_VOLTAGE, NodeClass::Supply).driven();

        let mut node_map = HashMap::new();
        for alias in GROUND_ALIASES {
            node_map.insert(alias.to_string(), NodeId::GROUND);
        }
        for alias in SUPPLY_ALIASES {
            node_map.insert(alias.to_string(), NodeId::SUPPLY);
        }

        Self {
            title: None,
            nodes: vec![ground, supply],
            node_map,
            devices: Vec::new(),
            device_map: HashMap::new(),
        }
    }

    /// Set the circuit title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    fn insert_node(&mut self, node: Node) -> Result<NodeId> {
        if let Some(existing) = self.node_map.get(&node.name) {
            return Err(if existing.is_rail() {
                SimError::ReservedNode { name: node.name }
            } else {
                SimError::DuplicateNode { name: node.name }
            });
        }
        if !node.voltage.is_finite() {
            return Err(SimError::InvalidTopology {
                message: format!("node '{}' has a non-finite initial voltage", node.name),
            });
        }

        let id = NodeId(self.nodes.len());
        self.node_map.insert(node.name.clone(), id);
        self.nodes.push(node);
        Ok(id)
    }

    /// Add a free node.
    pub fn add_node(&mut self, name: &str, voltage: f64, class: NodeClass) -> Result<NodeId> {
        self.insert_node(Node::new(name, voltage, class))
    }

    /// Add an externally driven node (a slider input).
    pub fn add_input(&mut self, name: &str, voltage: f64, class: NodeClass) -> Result<NodeId> {
        self.insert_node(Node::new(name, voltage, class).driven())
    }

    /// Add a device whose terminals are given by name in gate, source, drain, body order.
    pub fn add_device(
        &mut self,
        name: &str,
        mosfet_type: MosfetType,
        terminals: [&str; 4],
    ) -> Result<DeviceId> {
        if self.device_map.contains_key(name) {
            return Err(SimError::DuplicateDevice {
                name: name.to_string(),
            });
        }

        let mut ids = [NodeId::GROUND; 4];
        for (slot, terminal) in ids.iter_mut().zip(terminals) {
            *slot = *self
                .node_map
                .get(terminal)
                .ok_or_else(|| SimError::NodeNotFound {
                    node: terminal.to_string(),
                })?;
        }

        let id = DeviceId(self.devices.len());
        self.device_map.insert(name.to_string(), id);
        self.devices
            .push(Mosfet::new(id, name.to_string(), mosfet_type, ids));
        Ok(id)
    }

    /// Add an N-channel device.
    pub fn add_nmos(&mut self, name: &str, terminals: [&str; 4]) -> Result<DeviceId> {
        self.add_device(name, MosfetType::Nmos, terminals)
    }

    /// Add a P-channel device.
    pub fn add_pmos(&mut self, name: &str, terminals: [&str; 4]) -> Result<DeviceId> {
        self.add_device(name, MosfetType::Pmos, terminals)
    }

    /// Finish construction.
    pub fn build(self) -> Circuit {
        debug!(
            "built circuit {:?}: {} nodes, {} devices",
            self.title.as_deref().unwrap_or("<untitled>"),
            self.nodes.len(),
            self.devices.len()
        );
        Circuit {
            title: self.title,
            nodes: self.nodes,
            devices: self.devices,
            node_map: self.node_map,
            device_map: self.device_map,
        }
    }
}

//! Abstract Syntax Tree types for the circuit DSL.

/// Complete AST representation of a parsed circuit.
#[derive(Debug, Clone)]
pub struct CircuitAst {
    /// Optional circuit title from `.circuit`
    pub title: Option<String>,
    /// Declared nodes, in declaration order
    pub nodes: Vec<NodeDef>,
    /// All device instances
    pub devices: Vec<DeviceDef>,
}

impl CircuitAst {
    /// Create a new empty circuit AST.
    pub fn new() -> Self {
        Self {
            title: None,
            nodes: Vec::new(),
            devices: Vec::new(),
        }
    }
}

impl Default for CircuitAst {
    fn default() -> Self {
        Self::new()
    }
}

/// A `.node` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDef {
    /// Node name
    pub name: String,
    /// Initial voltage (defaults to 0V)
    pub voltage: f64,
    /// Node belongs to the heavier supply capacitance class
    pub supply: bool,
    /// Node is externally driven (slider input), fixed unless released
    pub input: bool,
    /// Source line number for error reporting
    pub line: usize,
}

/// A device definition from the DSL.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceDef {
    /// Device name (including the `M` prefix)
    pub name: String,
    /// Device polarity
    pub device_type: DeviceType,
    /// Terminal node names in gate, source, drain, body order
    pub terminals: [String; 4],
    /// Source line number for error reporting
    pub line: usize,
}

impl DeviceDef {
    /// Gate node name.
    pub fn gate(&self) -> &str {
        &self.terminals[0]
    }

    /// Source node name.
    pub fn source(&self) -> &str {
        &self.terminals[1]
    }

    /// Drain node name.
    pub fn drain(&self) -> &str {
        &self.terminals[2]
    }

    /// Body node name.
    pub fn body(&self) -> &str {
        &self.terminals[3]
    }
}

/// Device types supported by the DSL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    /// N-channel MOSFET
    Nmos,
    /// P-channel MOSFET
    Pmos,
}

impl DeviceType {
    /// Parse a device type from its model keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_uppercase().as_str() {
            "NMOS" | "N" => Some(Self::Nmos),
            "PMOS" | "P" => Some(Self::Pmos),
            _ => None,
        }
    }

    /// Single-character prefix that introduces a device line.
    pub const PREFIX: char = 'M';
}

//! Built-in circuit library.
//!
//! Each entry is a topology in the circuit DSL, addressed by a short key.
//! The key is what a front end sends as the circuit selector.

use crate::circuit::{validate_circuit, Circuit};
use crate::dsl;
use crate::error::{Result, SimError};

/// A named circuit shipped with the simulator.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinCircuit {
    pub key: &'static str,
    pub description: &'static str,
    pub source: &'static str,
}

pub const BUILTIN_CIRCUITS: &[BuiltinCircuit] = &[
    BuiltinCircuit {
        key: "nmos",
        description: "Single N-channel transistor with gate and drain sliders",
        source: "\
.circuit NMOS transistor
.node gate  2 input
.node drain 3 input

MN1 gate gnd drain gnd NMOS
",
    },
    BuiltinCircuit {
        key: "pmos",
        description: "Single P-channel transistor with gate and drain sliders",
        source: "\
.circuit PMOS transistor
.node gate  3 input
.node drain 2 input

MP1 gate vdd drain vdd PMOS
",
    },
    BuiltinCircuit {
        key: "inverter",
        description: "CMOS inverter",
        source: "\
.circuit CMOS inverter
.node in  0 input
.node out 5

MN1 in gnd out gnd NMOS
MP1 in vdd out vdd PMOS
",
    },
    BuiltinCircuit {
        key: "nand",
        description: "Two-input CMOS NAND gate",
        source: "\
.circuit CMOS NAND
.node a   0 input
.node b   0 input
.node out 5
.node mid 0

MP1 a vdd out vdd PMOS
MP2 b vdd out vdd PMOS
MN1 a mid out gnd NMOS
MN2 b gnd mid gnd NMOS
",
    },
    BuiltinCircuit {
        key: "nor",
        description: "Two-input CMOS NOR gate",
        source: "\
.circuit CMOS NOR
.node a   0 input
.node b   0 input
.node out 5
.node mid 5

MP1 a vdd mid vdd PMOS
MP2 b mid out vdd PMOS
MN1 a gnd out gnd NMOS
MN2 b gnd out gnd NMOS
",
    },
    BuiltinCircuit {
        key: "mirror",
        description: "NMOS current mirror with PMOS loads",
        source: "\
.circuit Current mirror
.node bias 3.5 input
.node ref  1
.node out  2.5

MP1 bias vdd ref vdd PMOS
MN1 ref  gnd ref gnd NMOS
MP2 bias vdd out vdd PMOS
MN2 ref  gnd out gnd NMOS
",
    },
];

/// Look up a built-in circuit by key.
pub fn find(key: &str) -> Option<&'static BuiltinCircuit> {
    BUILTIN_CIRCUITS.iter().find(|c| c.key == key)
}

/// Keys of all built-in circuits.
pub fn keys() -> impl Iterator<Item = &'static str> {
    BUILTIN_CIRCUITS.iter().map(|c| c.key)
}

/// Parse, build and validate a built-in circuit.
pub fn load(key: &str) -> Result<Circuit> {
    let builtin = find(key).ok_or_else(|| SimError::UnknownCircuit {
        key: key.to_string(),
    })?;
    let circuit = Circuit::from_ast(dsl::parse(builtin.source)?)?;
    validate_circuit(&circuit)?;
    Ok(circuit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_builtin_loads() {
        for key in keys() {
            let circuit = load(key).unwrap_or_else(|e| panic!("{key}: {e}"));
            assert!(circuit.num_devices() > 0);
            assert!(circuit.title.is_some());
        }
    }

    #[test]
    fn test_unknown_key() {
        assert!(matches!(
            load("flux-capacitor"),
            Err(SimError::UnknownCircuit { .. })
        ));
    }

    #[test]
    fn test_keys_are_unique() {
        let mut all: Vec<&str> = keys().collect();
        let count = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), count);
    }
}

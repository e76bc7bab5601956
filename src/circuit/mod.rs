//! Circuit graph representation and validation.
//!
//! This module provides the internal representation of a circuit after parsing.
//! The [`Circuit`] struct owns every node and device; devices address their
//! terminals through [`NodeId`] keys into the node arena.

mod graph;
mod types;
mod validate;

pub use graph::{Circuit, CircuitBuilder, GROUND_ALIASES, SUPPLY_ALIASES};
pub use types::*;
pub use validate::validate_circuit;

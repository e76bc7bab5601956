//! # MOSFET Sim
//!
//! An interactive transient simulator for small MOSFET circuits.
//!
//! This library provides:
//! - A small DSL for describing transistor-level topologies
//! - EKV long-channel transistor models (NMOS and PMOS)
//! - An explicit charge-integration solver tuned for animation-rate ticks
//! - A message-driven worker for running the simulation off the UI thread
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`dsl`] - Parser for the circuit description language
//! - [`circuit`] - Node arena, circuit graph and validation
//! - [`components`] - EKV model and the MOSFET device
//! - [`solver`] - Per-tick integration and bounce detection
//! - [`circuits`] - Built-in example circuits addressed by key
//! - [`worker`] - Serialized request/snapshot protocol and worker thread
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! mosfet-sim --builtin inverter --pin in=5 --ticks 200
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { WasmCircuitSim } from 'mosfet_sim';
//!
//! const sim = WasmCircuitSim.from_builtin('inverter');
//! sim.begin_drag('in', 5.0);
//! sim.step();
//! ```
//!
//! ## Simulation Method
//!
//! Every node is a capacitor to ground. Each tick evaluates all transistors
//! against the voltages from the start of the tick, sums their currents into
//! the nodes and moves every free node by `I·Δt/C`, clamped to 0.1 V. Node
//! capacitance grows while a node oscillates and decays back once it settles.

pub mod circuit;
pub mod circuits;
pub mod components;
pub mod dsl;
pub mod error;
pub mod solver;
pub mod ticker;
pub mod worker;

// Re-export main types for convenience
pub use circuit::Circuit;
pub use error::{Result, SimError};
pub use solver::{Simulator, SimulatorConfig};
pub use ticker::Ticker;

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmCircuitSim;

/// Thermal voltage used by the transistor model (V)
pub const THERMAL_VOLTAGE: f64 = 0.0256;

/// Ground rail voltage (V)
pub const GROUND_VOLTAGE: f64 = 0.0;

/// Supply rail voltage (V)
pub const SUPPLY_VOLTAGE: f64 = 5.0;

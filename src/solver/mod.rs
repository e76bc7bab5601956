//! Transient solver.
//!
//! This module provides the numerical engine for circuit simulation.
//!
//! ## Explicit Charge Integration
//!
//! Each node is a capacitor to ground. For a timestep Δt the solver:
//!
//! 1. Evaluates every device on the voltages at the start of the tick
//! 2. Sums the signed device currents into each node
//! 3. Moves each free node by `ΔV = I·Δt / C`, clamped to a fixed limit
//!
//! There is no matrix and no convergence loop. The clamp and the adaptive
//! node capacitance ([`bounce`]) keep forward Euler visually stable at
//! animation-frame timesteps, at the expense of numerical accuracy.

pub mod bounce;
mod integrator;
mod simulator;

pub use integrator::{integrate_node, tick, tick_with, IntegratorOptions};
pub use simulator::{Simulator, SimulatorConfig};

/// Default timestep per tick in milliseconds.
pub const DEFAULT_TIMESTEP_MS: f64 = 20.0;

/// Largest voltage change a node may make in one tick (V).
pub const MAX_VOLTAGE_STEP: f64 = 0.1;

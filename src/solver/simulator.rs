//! Main simulator interface.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::circuit::Circuit;
use crate::error::{Result, SimError};

use super::integrator::{tick_with, IntegratorOptions};
use super::{DEFAULT_TIMESTEP_MS, MAX_VOLTAGE_STEP};

/// Configuration for the simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    /// Timestep per tick in milliseconds; also the real-time tick period.
    pub timestep_ms: f64,
    /// Per-tick voltage clamp (V).
    pub max_step: f64,
    /// Include channel-length modulation in device currents.
    pub early_effect: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            timestep_ms: DEFAULT_TIMESTEP_MS,
            max_step: MAX_VOLTAGE_STEP,
            early_effect: false,
        }
    }
}

impl SimulatorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timestep (in milliseconds).
    pub fn with_timestep_ms(mut self, timestep_ms: f64) -> Self {
        self.timestep_ms = timestep_ms;
        self
    }

    /// Set the per-tick voltage clamp (in volts).
    ///
    /// Smaller values give smoother animation at the cost of slower settling
    /// after large disturbances.
    pub fn with_max_step(mut self, max_step: f64) -> Self {
        self.max_step = max_step;
        self
    }

    /// Enable or disable the Early effect.
    pub fn with_early_effect(mut self, early_effect: bool) -> Self {
        self.early_effect = early_effect;
        self
    }

    /// Check that all values are usable.
    pub fn validate(&self) -> Result<()> {
        check_timestep(self.timestep_ms)?;
        if Duration::try_from_secs_f64(self.timestep_ms * 1e-3).is_err() {
            return Err(SimError::invalid_param(format!(
                "timestep of {} ms is too long to schedule",
                self.timestep_ms
            )));
        }
        if !(self.max_step.is_finite() && self.max_step > 0.0) {
            return Err(SimError::invalid_param(format!(
                "voltage step limit must be positive, got {}",
                self.max_step
            )));
        }
        Ok(())
    }

    /// Tick period for real-time scheduling.
    pub fn period(&self) -> Result<Duration> {
        self.validate()?;
        Duration::try_from_secs_f64(self.timestep_ms * 1e-3)
            .map_err(|e| SimError::invalid_param(e.to_string()))
    }

    /// Options passed to the integrator each tick.
    pub fn integrator_options(&self) -> IntegratorOptions {
        IntegratorOptions {
            max_step: self.max_step,
            early_effect: self.early_effect,
        }
    }
}

fn check_timestep(dt_ms: f64) -> Result<()> {
    if dt_ms.is_finite() && dt_ms > 0.0 {
        Ok(())
    } else {
        Err(SimError::invalid_param(format!(
            "timestep must be a positive number of milliseconds, got {}",
            dt_ms
        )))
    }
}

/// The main circuit simulator.
///
/// Owns one circuit and advances it tick by tick. Between ticks, callers
/// may read voltages and pin or release nodes.
#[derive(Debug, Clone)]
pub struct Simulator {
    /// The circuit being simulated
    circuit: Circuit,
    /// Simulation settings
    config: SimulatorConfig,
    /// Ticks completed so far
    ticks: u64,
}

impl Simulator {
    /// Create a new simulator for the given circuit with default configuration.
    pub fn new(circuit: Circuit) -> Self {
        Self {
            circuit,
            config: SimulatorConfig::default(),
            ticks: 0,
        }
    }

    /// Create a new simulator for the given circuit with custom configuration.
    pub fn with_config(circuit: Circuit, config: SimulatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            circuit,
            config,
            ticks: 0,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Enable or disable the Early effect for subsequent ticks.
    pub fn set_early_effect(&mut self, early_effect: bool) {
        self.config.early_effect = early_effect;
    }

    /// Advance the simulation by one configured timestep.
    pub fn step(&mut self) {
        self.advance(self.config.timestep_ms);
    }

    /// Advance the simulation by an explicit timestep in milliseconds.
    pub fn step_by(&mut self, dt_ms: f64) -> Result<()> {
        check_timestep(dt_ms)?;
        self.advance(dt_ms);
        Ok(())
    }

    fn advance(&mut self, dt_ms: f64) {
        tick_with(&mut self.circuit, dt_ms, self.config.integrator_options());
        self.ticks += 1;
    }

    /// Run `ticks` consecutive steps.
    pub fn run(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.step();
        }
    }

    /// Number of ticks completed.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Get the current voltage at a node by name.
    pub fn node_voltage(&self, name: &str) -> Option<f64> {
        self.circuit.node_voltage(name)
    }

    /// Get the last computed current through a device by name.
    pub fn device_current(&self, name: &str) -> Option<f64> {
        let id = self.circuit.find_device(name)?;
        Some(self.circuit.device(id).current())
    }

    /// Pin a node to a voltage (start or continue a drag).
    pub fn pin(&mut self, name: &str, voltage: f64) -> Result<()> {
        self.circuit.pin(name, voltage)
    }

    /// Set a node's voltage, leaving it free or held as it was.
    pub fn set_node_voltage(&mut self, name: &str, voltage: f64) -> Result<()> {
        self.circuit.set_voltage(name, voltage)
    }

    /// Release a pinned node (end a drag).
    pub fn release(&mut self, name: &str) -> Result<()> {
        self.circuit.release(name)
    }

    /// Apply a complete set of pinned node voltages.
    pub fn apply_drive(&mut self, pinned: &BTreeMap<String, f64>) -> Result<()> {
        self.circuit.apply_drive(pinned)
    }

    /// Snapshot of every node voltage.
    pub fn voltages(&self) -> BTreeMap<String, f64> {
        self.circuit.voltages()
    }

    /// Get a reference to the circuit.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Get a mutable reference to the circuit.
    pub fn circuit_mut(&mut self) -> &mut Circuit {
        &mut self.circuit
    }
}

//! Message-driven simulation state shared by the worker thread and the
//! WASM bindings.

use std::collections::HashMap;

use log::debug;

use super::protocol::{Request, VoltageSnapshot};
use crate::circuits;
use crate::error::{Result, SimError};
use crate::solver::{Simulator, SimulatorConfig};

/// Holds one simulator per circuit key and tracks which one is active.
///
/// Switching circuits keeps the previous circuit's state, so switching back
/// resumes where it left off.
#[derive(Debug)]
pub struct WorkerEngine {
    config: SimulatorConfig,
    simulators: HashMap<String, Simulator>,
    active: Option<String>,
}

impl WorkerEngine {
    /// Create an engine; the config is validated once here.
    pub fn new(config: SimulatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            simulators: HashMap::new(),
            active: None,
        })
    }

    /// Key of the circuit currently being simulated.
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Simulator for the active circuit.
    pub fn simulator(&self) -> Option<&Simulator> {
        self.simulators.get(self.active.as_deref()?)
    }

    /// Decode and apply one inbound message.
    pub fn handle_message(&mut self, text: &str) -> Result<()> {
        let request = Request::decode(text)?;
        self.apply(&request)
    }

    /// Select the requested circuit and apply its drive state and flags.
    ///
    /// Nothing changes when the request is rejected.
    pub fn apply(&mut self, request: &Request) -> Result<()> {
        let key = request.circuit();
        if !self.simulators.contains_key(key) {
            let circuit = circuits::load(key)?;
            let simulator = Simulator::with_config(circuit, self.config.clone())?;
            debug!("worker loaded circuit '{}'", key);
            self.simulators.insert(key.to_string(), simulator);
        }

        if let Some(simulator) = self.simulators.get_mut(key) {
            simulator.apply_drive(&request.drive().pinned)?;
            simulator.set_early_effect(request.flags().early_effect);
        }

        if self.active.as_deref() != Some(key) {
            debug!("worker switched to circuit '{}'", key);
            self.active = Some(key.to_string());
        }
        Ok(())
    }

    /// Advance the active circuit one tick and return its voltages.
    pub fn tick_active(&mut self) -> Option<VoltageSnapshot> {
        let key = self.active.as_ref()?;
        let simulator = self.simulators.get_mut(key)?;
        simulator.step();
        Some(VoltageSnapshot {
            circuit: key.clone(),
            voltages: simulator.voltages(),
        })
    }

    /// Apply a message, tick once and return the encoded snapshot.
    pub fn respond(&mut self, text: &str) -> Result<String> {
        let request = Request::decode(text)?;
        self.apply(&request)?;
        let snapshot = self
            .tick_active()
            .ok_or_else(|| SimError::UnknownCircuit {
                key: request.circuit().to_string(),
            })?;
        snapshot.encode()
    }
}

//! WASM bindings for MOSFET Sim.
//!
//! Two ways to use the simulator from JavaScript:
//!
//! - [`WasmCircuitSim`] owns one circuit directly, for pages that tick on
//!   the main thread.
//! - [`WasmCircuitSim::handle_message`] speaks the worker protocol, for a
//!   simulation running inside a Web Worker.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmCircuitSim } from 'mosfet_sim';
//!
//! await init();
//!
//! const sim = WasmCircuitSim.from_builtin('inverter');
//!
//! slider.oninput = () => sim.begin_drag('in', slider.valueAsNumber);
//! slider.onchange = () => sim.end_drag('in');
//!
//! setInterval(() => {
//!   sim.step();
//!   render(sim.node_voltage('out'));
//! }, 20);
//! ```
//!
//! ## Usage (Web Worker)
//!
//! ```javascript
//! const sim = WasmCircuitSim.worker();
//! onmessage = (e) => sim.handle_message(e.data);
//! setInterval(() => {
//!   const snapshot = sim.tick_active();
//!   if (snapshot) postMessage(snapshot);
//! }, 20);
//! ```

use wasm_bindgen::prelude::*;

use crate::circuit::{validate_circuit, Circuit};
use crate::circuits;
use crate::dsl;
use crate::error::SimError;
use crate::solver::{Simulator, SimulatorConfig};
use crate::worker::WorkerEngine;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn js_err(e: SimError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

enum Backend {
    Single(Simulator),
    Worker(WorkerEngine),
}

/// WASM-compatible MOSFET circuit simulator.
#[wasm_bindgen]
pub struct WasmCircuitSim {
    backend: Backend,
}

impl WasmCircuitSim {
    fn simulator(&self) -> Option<&Simulator> {
        match &self.backend {
            Backend::Single(sim) => Some(sim),
            Backend::Worker(engine) => engine.simulator(),
        }
    }

    fn simulator_mut(&mut self) -> Result<&mut Simulator, JsValue> {
        match &mut self.backend {
            Backend::Single(sim) => Ok(sim),
            Backend::Worker(_) => Err(JsValue::from_str(
                "worker-mode simulators are driven through handle_message",
            )),
        }
    }
}

#[wasm_bindgen]
impl WasmCircuitSim {
    /// Create a new simulator from a circuit DSL string.
    ///
    /// # Example
    /// ```javascript
    /// const sim = new WasmCircuitSim(`
    ///   .node in 0 input
    ///   .node out 5
    ///   MN1 in gnd out gnd NMOS
    ///   MP1 in vdd out vdd PMOS
    /// `);
    /// ```
    #[wasm_bindgen(constructor)]
    pub fn new(circuit_dsl: &str) -> Result<WasmCircuitSim, JsValue> {
        let ast = dsl::parse(circuit_dsl).map_err(js_err)?;
        let circuit = Circuit::from_ast(ast).map_err(js_err)?;
        validate_circuit(&circuit).map_err(js_err)?;
        Ok(Self {
            backend: Backend::Single(Simulator::new(circuit)),
        })
    }

    /// Create a simulator for a built-in circuit.
    #[wasm_bindgen]
    pub fn from_builtin(key: &str) -> Result<WasmCircuitSim, JsValue> {
        let circuit = circuits::load(key).map_err(js_err)?;
        Ok(Self {
            backend: Backend::Single(Simulator::new(circuit)),
        })
    }

    /// Create a message-driven simulator for use inside a Web Worker.
    #[wasm_bindgen]
    pub fn worker() -> Result<WasmCircuitSim, JsValue> {
        let engine = WorkerEngine::new(SimulatorConfig::default()).map_err(js_err)?;
        Ok(Self {
            backend: Backend::Worker(engine),
        })
    }

    /// Apply one inbound worker message
    /// (`[circuitSelector, {"pinned": {...}}, {"earlyEffect": bool}]`).
    #[wasm_bindgen]
    pub fn handle_message(&mut self, message: &str) -> Result<(), JsValue> {
        match &mut self.backend {
            Backend::Worker(engine) => engine.handle_message(message).map_err(js_err),
            Backend::Single(_) => Err(JsValue::from_str(
                "handle_message requires a simulator created with worker()",
            )),
        }
    }

    /// Tick the active worker circuit and return the snapshot JSON, or
    /// `undefined` before the first message.
    #[wasm_bindgen]
    pub fn tick_active(&mut self) -> Result<Option<String>, JsValue> {
        match &mut self.backend {
            Backend::Worker(engine) => engine
                .tick_active()
                .map(|s| s.encode())
                .transpose()
                .map_err(js_err),
            Backend::Single(_) => Err(JsValue::from_str(
                "tick_active requires a simulator created with worker()",
            )),
        }
    }

    /// Advance one default timestep.
    #[wasm_bindgen]
    pub fn step(&mut self) -> Result<(), JsValue> {
        self.simulator_mut()?.step();
        Ok(())
    }

    /// Advance by an explicit timestep in milliseconds (e.g. the frame delta).
    #[wasm_bindgen]
    pub fn step_by(&mut self, dt_ms: f64) -> Result<(), JsValue> {
        self.simulator_mut()?.step_by(dt_ms).map_err(js_err)
    }

    /// Enable or disable the Early effect.
    #[wasm_bindgen]
    pub fn set_early_effect(&mut self, enabled: bool) -> Result<(), JsValue> {
        self.simulator_mut()?.set_early_effect(enabled);
        Ok(())
    }

    /// Set a node's voltage once; a free node keeps evolving from there.
    #[wasm_bindgen]
    pub fn set_node_voltage(&mut self, node_name: &str, voltage: f64) -> Result<(), JsValue> {
        self.simulator_mut()?
            .set_node_voltage(node_name, voltage)
            .map_err(js_err)
    }

    /// Hold a node at a voltage while it is dragged.
    #[wasm_bindgen]
    pub fn begin_drag(&mut self, node_name: &str, voltage: f64) -> Result<(), JsValue> {
        self.simulator_mut()?.pin(node_name, voltage).map_err(js_err)
    }

    /// Let a dragged node evolve again. Input nodes stay where they were left.
    #[wasm_bindgen]
    pub fn end_drag(&mut self, node_name: &str) -> Result<(), JsValue> {
        self.simulator_mut()?.release(node_name).map_err(js_err)
    }

    /// Get the current voltage at a named node, or `undefined`.
    #[wasm_bindgen]
    pub fn node_voltage(&self, node_name: &str) -> Option<f64> {
        self.simulator()?.node_voltage(node_name)
    }

    /// Get the last computed current through a named device, or `undefined`.
    #[wasm_bindgen]
    pub fn device_current(&self, device_name: &str) -> Option<f64> {
        self.simulator()?.device_current(device_name)
    }

    /// All node voltages as a JSON object.
    #[wasm_bindgen]
    pub fn voltages_json(&self) -> Result<String, JsValue> {
        let voltages = self.simulator().map(|s| s.voltages()).unwrap_or_default();
        serde_json::to_string(&voltages).map_err(|e| js_err(e.into()))
    }

    /// Ticks completed by the current circuit.
    #[wasm_bindgen(getter)]
    pub fn ticks(&self) -> f64 {
        self.simulator().map(|s| s.ticks() as f64).unwrap_or(0.0)
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Keys of the built-in circuits, newline separated.
#[wasm_bindgen]
pub fn builtin_circuits() -> String {
    circuits::keys().collect::<Vec<_>>().join("\n")
}

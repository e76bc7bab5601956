//! Off-thread simulation.
//!
//! The UI-facing side and the simulation side never share a circuit. They
//! exchange JSON messages (see [`protocol`]): the front end posts the circuit
//! selector together with the pinned nodes and feature flags, and the worker
//! answers every tick with a voltage snapshot. [`SnapshotInbox`] filters the
//! answers down to the newest one for the circuit currently on screen.
//!
//! [`WorkerEngine`] holds the simulation state and is shared by the native
//! [`SimWorker`] thread and the WASM bindings, which run inside a Web Worker.

mod engine;
mod inbox;
pub mod protocol;
#[cfg(not(target_arch = "wasm32"))]
mod thread;

pub use engine::WorkerEngine;
pub use inbox::SnapshotInbox;
pub use protocol::{DriveState, FeatureFlags, Request, VoltageSnapshot};
#[cfg(not(target_arch = "wasm32"))]
pub use thread::SimWorker;

//! Worker message protocol.
//!
//! Both directions carry JSON text. A request is a three-element array
//!
//! ```text
//! ["inverter", {"pinned": {"in": 2.5}}, {"earlyEffect": false}]
//! ```
//!
//! naming the circuit, the externally pinned nodes and the feature flags.
//! A snapshot is an object holding the circuit key and every node voltage:
//!
//! ```text
//! {"circuit": "inverter", "voltages": {"gnd": 0.0, "in": 2.5, "out": 2.1, "vdd": 5.0}}
//! ```
//!
//! The format is a private contract between two copies of the same build and
//! carries no version.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Nodes held at a voltage by the front end (sliders, drags).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriveState {
    #[serde(default)]
    pub pinned: BTreeMap<String, f64>,
}

impl DriveState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pinned node.
    pub fn with_pin(mut self, node: impl Into<String>, voltage: f64) -> Self {
        self.pinned.insert(node.into(), voltage);
        self
    }
}

/// Optional model features.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFlags {
    #[serde(default)]
    pub early_effect: bool,
}

/// Inbound message: `[circuitSelector, driveState, featureFlags]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request(pub String, pub DriveState, pub FeatureFlags);

impl Request {
    pub fn new(circuit: impl Into<String>, drive: DriveState, flags: FeatureFlags) -> Self {
        Self(circuit.into(), drive, flags)
    }

    /// Circuit selector.
    pub fn circuit(&self) -> &str {
        &self.0
    }

    pub fn drive(&self) -> &DriveState {
        &self.1
    }

    pub fn flags(&self) -> FeatureFlags {
        self.2
    }

    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Outbound message: the node voltages of one circuit after a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoltageSnapshot {
    pub circuit: String,
    pub voltages: BTreeMap<String, f64>,
}

impl VoltageSnapshot {
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

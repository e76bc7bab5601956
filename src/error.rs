//! Error types for the MOSFET simulator.
//!
//! This module provides a unified error type [`SimError`] that covers
//! all error conditions that can occur during circuit-definition parsing,
//! circuit construction, simulation setup and the worker message protocol.
//!
//! The transient solver itself has no error path: once a circuit has been
//! built, every tick succeeds.

use thiserror::Error;

/// Result type alias using [`SimError`].
pub type Result<T> = std::result::Result<T, SimError>;

/// Unified error type for all simulator operations.
#[derive(Error, Debug)]
pub enum SimError {
    // ============ DSL Parsing Errors ============
    /// Error during lexical analysis
    #[error("Lexer error at line {line}, column {column}: {message}")]
    LexerError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Error during parsing
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Invalid device definition
    #[error("Invalid device '{name}' at line {line}: {message}")]
    InvalidDevice {
        name: String,
        line: usize,
        message: String,
    },

    /// Unknown device type
    #[error("Unknown device type '{device_type}' at line {line}")]
    UnknownDeviceType { device_type: String, line: usize },

    // ============ Circuit Construction Errors ============
    /// Node not found in circuit
    #[error("Node '{node}' not found in circuit")]
    NodeNotFound { node: String },

    /// Device not found in circuit
    #[error("Device '{device}' not found in circuit")]
    DeviceNotFound { device: String },

    /// Duplicate node declaration
    #[error("Duplicate node name '{name}'")]
    DuplicateNode { name: String },

    /// Duplicate device name
    #[error("Duplicate device name '{name}'")]
    DuplicateDevice { name: String },

    /// Attempt to declare or drive one of the supply rails
    #[error("Node '{name}' is a reserved supply rail")]
    ReservedNode { name: String },

    /// Invalid circuit topology
    #[error("Invalid circuit topology: {message}")]
    InvalidTopology { message: String },

    /// Unknown built-in circuit key
    #[error("Unknown circuit '{key}'")]
    UnknownCircuit { key: String },

    // ============ Simulation Errors ============
    /// Invalid simulation parameter
    #[error("Invalid simulation parameter: {message}")]
    InvalidSimulationParam { message: String },

    // ============ I/O Errors ============
    /// Error reading circuit file
    #[error("Failed to read circuit file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed worker message
    #[error("Malformed worker message: {0}")]
    Protocol(#[from] serde_json::Error),

    /// The worker thread could not be started
    #[error("Failed to spawn simulation worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// The worker thread is no longer running
    #[error("Simulation worker has shut down")]
    WorkerDisconnected,
}

impl SimError {
    /// Create a lexer error
    pub fn lexer(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::LexerError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid device error
    pub fn invalid_device(name: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::InvalidDevice {
            name: name.into(),
            line,
            message: message.into(),
        }
    }

    /// Create an invalid simulation parameter error
    pub fn invalid_param(message: impl Into<String>) -> Self {
        Self::InvalidSimulationParam {
            message: message.into(),
        }
    }
}

//! Device models for circuit simulation.
//!
//! The simulator knows a single device: the four-terminal MOSFET, in N- and
//! P-channel polarity. Drain current comes from the EKV model in [`ekv`],
//! which is a pure function of the terminal voltages; [`Mosfet`] binds that
//! model to nodes of a circuit and caches the last evaluation.

pub mod ekv;
mod mosfet;

pub use ekv::{ekv_nmos, ekv_pmos, EkvOutput, EkvParams, TerminalVoltages};
pub use mosfet::{Mosfet, MosfetType};

//! DSL (Domain Specific Language) parser for circuit descriptions.
//!
//! This module provides a small SPICE-inspired text format for describing
//! MOSFET circuits. The DSL is line-oriented and human-editable.
//!
//! # Grammar Overview
//!
//! ```text
//! circuit     = { line }
//! line        = comment | directive | device | empty
//! comment     = ('#' | ';') { any_char }
//! directive   = ".circuit" word { word }
//!             | ".node" node [voltage] { "supply" | "input" }
//! device      = 'M' name gate source drain body polarity
//!
//! polarity    = "NMOS" | "PMOS"
//! node        = identifier | "0"
//! voltage     = number [unit_suffix] ['V']
//!
//! number      = ['-'] digit+ ['.' digit+] [('e'|'E') ['-'|'+'] digit+]
//! unit_suffix = 'p' | 'n' | 'u' | 'm' | 'k'
//! identifier  = (letter | '_') { letter | digit | '_' }
//! ```
//!
//! # Reserved Nodes
//!
//! | Name | Rail | Voltage |
//! |------|------|---------|
//! | `gnd`, `GND`, `0` | Ground | 0V |
//! | `vdd`, `VDD` | Supply | 5V |
//!
//! Rails are always present and must not be declared with `.node`.
//!
//! # Node Attributes
//!
//! | Attribute | Meaning |
//! |-----------|---------|
//! | `supply` | Heavier capacitance class (bulk nets) |
//! | `input` | Externally driven (slider); fixed unless released |
//!
//! # Example
//!
//! ```text
//! # CMOS inverter
//! .circuit inverter
//! .node in  0   input
//! .node out 5
//!
//! MN1 in gnd out gnd NMOS
//! MP1 in vdd out vdd PMOS
//! ```

mod ast;
mod lexer;
mod parser;

pub use ast::*;
pub use lexer::{parse_value, Lexer, Token, TokenKind};
pub use parser::Parser;

use crate::error::Result;

/// Parse a circuit DSL string into an AST.
pub fn parse(input: &str) -> Result<CircuitAst> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer)?;
    parser.parse()
}

/// Parse a circuit DSL file.
#[cfg(feature = "cli")]
pub fn parse_file(path: &std::path::Path) -> Result<CircuitAst> {
    let content = std::fs::read_to_string(path).map_err(|e| crate::error::SimError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse(&content)
}

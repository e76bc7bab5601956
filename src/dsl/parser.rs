//! Parser for the circuit DSL.

use super::ast::*;
use super::lexer::{parse_value, Lexer, Token, TokenKind};
use crate::error::{Result, SimError};

/// Parser for circuit DSL.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Create a new parser with the given lexer.
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self> {
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    /// Parse the entire circuit description.
    pub fn parse(&mut self) -> Result<CircuitAst> {
        let mut ast = CircuitAst::new();

        while self.current.kind != TokenKind::Eof {
            match self.current.kind {
                TokenKind::Newline => {
                    self.advance()?;
                    continue;
                }
                TokenKind::Directive => self.parse_directive(&mut ast)?,
                TokenKind::Identifier => {
                    let device = self.parse_device()?;
                    ast.devices.push(device);
                }
                _ => {
                    return Err(SimError::parse(
                        self.current.line,
                        format!("unexpected token: {:?}", self.current.text),
                    ));
                }
            }

            // Every statement must end the line
            match self.current.kind {
                TokenKind::Newline => self.advance()?,
                TokenKind::Eof => {}
                _ => {
                    return Err(SimError::parse(
                        self.current.line,
                        format!("unexpected trailing token: {:?}", self.current.text),
                    ));
                }
            }
        }

        Ok(ast)
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn at_line_end(&self) -> bool {
        matches!(self.current.kind, TokenKind::Newline | TokenKind::Eof)
    }

    /// Consume a node name: an identifier or the literal ground `0`.
    fn expect_node(&mut self) -> Result<String> {
        let tok = self.current.clone();
        match tok.kind {
            TokenKind::Identifier => {
                self.advance()?;
                Ok(tok.text)
            }
            TokenKind::Number if tok.text == "0" => {
                self.advance()?;
                Ok(tok.text)
            }
            _ => Err(SimError::parse(
                tok.line,
                format!("expected node name, got {:?}", tok.text),
            )),
        }
    }

    fn parse_directive(&mut self, ast: &mut CircuitAst) -> Result<()> {
        let directive = self.current.text.clone();
        let line = self.current.line;
        self.advance()?;

        match directive.to_lowercase().as_str() {
            ".circuit" => {
                let mut words = Vec::new();
                while !self.at_line_end() {
                    words.push(self.current.text.clone());
                    self.advance()?;
                }
                if words.is_empty() {
                    return Err(SimError::parse(line, ".circuit requires a name"));
                }
                ast.title = Some(words.join(" "));
            }
            ".node" => {
                let node = self.parse_node_def(line)?;
                ast.nodes.push(node);
            }
            _ => {
                return Err(SimError::parse(
                    line,
                    format!("unknown directive: {}", directive),
                ));
            }
        }

        Ok(())
    }

    fn parse_node_def(&mut self, line: usize) -> Result<NodeDef> {
        let name = self.expect_node()?;
        let mut node = NodeDef {
            name,
            voltage: 0.0,
            supply: false,
            input: false,
            line,
        };
        let mut has_voltage = false;

        while !self.at_line_end() {
            let tok = self.current.clone();
            match tok.kind {
                TokenKind::Number if !has_voltage => {
                    node.voltage = parse_value(&tok.text).ok_or_else(|| {
                        SimError::parse(line, format!("invalid voltage: {}", tok.text))
                    })?;
                    has_voltage = true;
                }
                TokenKind::Identifier => match tok.text.to_lowercase().as_str() {
                    "supply" => node.supply = true,
                    "input" => node.input = true,
                    other => {
                        return Err(SimError::parse(
                            line,
                            format!("unknown node attribute: {}", other),
                        ));
                    }
                },
                _ => {
                    return Err(SimError::parse(
                        line,
                        format!("unexpected token in node declaration: {:?}", tok.text),
                    ));
                }
            }
            self.advance()?;
        }

        Ok(node)
    }

    fn parse_device(&mut self) -> Result<DeviceDef> {
        let name = self.current.text.clone();
        let line = self.current.line;

        let prefix = name.chars().next().map(|c| c.to_ascii_uppercase());
        if prefix != Some(DeviceType::PREFIX) {
            return Err(SimError::UnknownDeviceType {
                device_type: name,
                line,
            });
        }
        self.advance()?;

        let mut nodes = Vec::with_capacity(4);
        while nodes.len() < 4 {
            if self.at_line_end() {
                return Err(SimError::invalid_device(
                    &name,
                    line,
                    format!("expected 4 terminals (gate source drain body), got {}", nodes.len()),
                ));
            }
            nodes.push(self.expect_node()?);
        }

        if self.current.kind != TokenKind::Identifier {
            return Err(SimError::invalid_device(
                &name,
                line,
                "missing device type (NMOS or PMOS)",
            ));
        }
        let keyword = self.current.text.clone();
        let device_type = DeviceType::from_keyword(&keyword).ok_or_else(|| {
            SimError::UnknownDeviceType {
                device_type: keyword.clone(),
                line,
            }
        })?;
        self.advance()?;

        let [gate, source, drain, body]: [String; 4] = nodes
            .try_into()
            .map_err(|_| SimError::invalid_device(&name, line, "terminal count mismatch"))?;

        Ok(DeviceDef {
            name,
            device_type,
            terminals: [gate, source, drain, body],
            line,
        })
    }
}

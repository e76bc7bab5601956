//! Lexer (tokenizer) for the circuit DSL.

use crate::error::{Result, SimError};

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The token's text
    pub text: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

/// Token types in the DSL.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// An identifier (device name, node name, keyword)
    Identifier,
    /// A number (integer or floating point, possibly with suffix)
    Number,
    /// A directive (starts with '.')
    Directive,
    /// Newline
    Newline,
    /// End of file
    Eof,
}

/// Lexer for tokenizing circuit DSL input.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace_and_comments();

        let ch = match self.chars.peek().copied() {
            Some(ch) => ch,
            None => return Ok(self.token(TokenKind::Eof, String::new(), self.line, self.column)),
        };

        let start_column = self.column;
        let start_line = self.line;

        let token = match ch {
            '\n' => {
                self.advance();
                self.token(TokenKind::Newline, "\n".to_string(), start_line, start_column)
            }
            '.' => {
                self.advance();
                let text = self.read_identifier();
                if text.is_empty() {
                    return Err(SimError::lexer(
                        start_line,
                        start_column,
                        "expected directive name after '.'",
                    ));
                }
                self.token(TokenKind::Directive, format!(".{}", text), start_line, start_column)
            }
            '-' | '+' | '0'..='9' => {
                let text = self.read_number();
                self.token(TokenKind::Number, text, start_line, start_column)
            }
            _ if ch.is_alphabetic() || ch == '_' => {
                let text = self.read_identifier();
                self.token(TokenKind::Identifier, text, start_line, start_column)
            }
            _ => {
                return Err(SimError::lexer(
                    start_line,
                    start_column,
                    format!("unexpected character '{}'", ch),
                ));
            }
        };

        Ok(token)
    }

    fn token(&self, kind: TokenKind, text: String, line: usize, column: usize) -> Token {
        Token {
            kind,
            text,
            line,
            column,
        }
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if ch == ' ' || ch == '\t' || ch == '\r' {
                self.advance();
            } else if ch == '#' || ch == ';' {
                // Skip comment until end of line
                while let Some(&c) = self.chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut text = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        text
    }

    fn read_digits(&mut self, text: &mut String) {
        while let Some(&ch) = self.chars.peek() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self) -> String {
        let mut text = String::new();

        // Optional sign
        if let Some(&ch) = self.chars.peek() {
            if ch == '-' || ch == '+' {
                text.push(ch);
                self.advance();
            }
        }

        self.read_digits(&mut text);

        if let Some(&'.') = self.chars.peek() {
            text.push('.');
            self.advance();
            self.read_digits(&mut text);
        }

        if let Some(&ch) = self.chars.peek() {
            if ch == 'e' || ch == 'E' {
                text.push(ch);
                self.advance();
                if let Some(&sign) = self.chars.peek() {
                    if sign == '-' || sign == '+' {
                        text.push(sign);
                        self.advance();
                    }
                }
                self.read_digits(&mut text);
            }
        }

        // Unit suffix (p, n, u, m, k); a trailing 'V' is accepted and ignored
        if let Some(&ch) = self.chars.peek() {
            if matches!(ch, 'p' | 'n' | 'u' | 'µ' | 'm' | 'k') {
                text.push(ch);
                self.advance();
            }
        }
        if let Some(&ch) = self.chars.peek() {
            if ch == 'V' || ch == 'v' {
                self.advance();
            }
        }

        text
    }
}

/// Parse a number string with optional unit suffix.
pub fn parse_value(text: &str) -> Option<f64> {
    let text = text.trim();
    let last = text.chars().last()?;

    let multiplier = match last {
        'p' => 1e-12,
        'n' => 1e-9,
        'u' | 'µ' => 1e-6,
        'm' => 1e-3,
        'k' => 1e3,
        _ => 1.0,
    };
    let num_str = if multiplier != 1.0 {
        &text[..text.len() - last.len_utf8()]
    } else {
        text
    };

    num_str
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_value() {
        assert_relative_eq!(parse_value("2.5").unwrap(), 2.5);
        assert_relative_eq!(parse_value("500m").unwrap(), 0.5);
        assert_relative_eq!(parse_value("-1.2").unwrap(), -1.2);
        assert_relative_eq!(parse_value("1e-3").unwrap(), 1e-3);
        assert!(parse_value("abc").is_none());
        assert!(parse_value("").is_none());
    }

    #[test]
    fn test_lexer_device_line() {
        let mut lexer = Lexer::new("MN1 in gnd out 0 NMOS");
        let kinds: Vec<TokenKind> = std::iter::from_fn(|| {
            let tok = lexer.next_token().unwrap();
            (tok.kind != TokenKind::Eof).then_some(tok.kind)
        })
        .collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Number,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_lexer_directive_and_voltage_unit() {
        let mut lexer = Lexer::new(".node out 2.5V supply");

        let tok = lexer.next_token().unwrap();
        assert_eq!(tok.kind, TokenKind::Directive);
        assert_eq!(tok.text, ".node");

        lexer.next_token().unwrap();
        let tok = lexer.next_token().unwrap();
        assert_eq!(tok.kind, TokenKind::Number);
        assert_eq!(tok.text, "2.5");

        let tok = lexer.next_token().unwrap();
        assert_eq!(tok.text, "supply");
        assert_eq!(tok.column, 16);
    }

    #[test]
    fn test_lexer_rejects_stray_character() {
        let mut lexer = Lexer::new("MN1 in @");
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        let err = lexer.next_token().unwrap_err();
        assert!(matches!(err, SimError::LexerError { line: 1, column: 8, .. }));
    }
}

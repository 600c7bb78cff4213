//! Lexical analysis (tokenization)
//!
//! Source text is a flat list of pieces separated by commas or newlines. A
//! comma can be kept inside a string literal by escaping it as `\,`. Each
//! piece is trimmed and classified as a string, number, boolean or keyword;
//! empty pieces are ignored.

use crate::token::{keyword, Token};
use thiserror::Error;

mod literals;

pub use literals::parse_value;

/// Tokenizer errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    /// Piece is not a literal or a known keyword
    #[error("line {line}: unknown syntax `{text}`")]
    UnknownSyntax { line: u32, text: String },
    /// Piece looks numeric but does not parse
    #[error("line {line}: invalid number `{text}`")]
    InvalidNumber { line: u32, text: String },
}

/// A raw piece of source with its line number
#[derive(Debug, Clone, PartialEq)]
struct Piece {
    text: String,
    line: u32,
}

/// Lexer state for tokenizing source text
pub struct Lexer {
    /// Characters of source text
    chars: Vec<char>,
    /// Current position in chars
    current: usize,
    /// Current line number (1-indexed)
    line: u32,
}

impl Lexer {
    /// Create a new lexer for the given source text
    pub fn new(source: impl Into<String>) -> Self {
        let source: String = source.into();
        Self {
            chars: source.chars().collect(),
            current: 0,
            line: 1,
        }
    }

    /// Tokenize the whole source
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        while let Some(piece) = self.next_piece() {
            let text = piece.text.trim();
            if text.is_empty() {
                continue;
            }
            let token = classify(text, piece.line)?;
            tracing::debug!(line = piece.line, %token, "registering token");
            tokens.push(token);
        }

        Ok(tokens)
    }

    /// Read up to the next unescaped separator
    fn next_piece(&mut self) -> Option<Piece> {
        if self.is_at_end() {
            return None;
        }

        let line = self.line;
        let mut text = String::new();

        while !self.is_at_end() {
            let c = self.advance();
            match c {
                ',' => break,
                '\n' => {
                    self.line += 1;
                    break;
                }
                '\\' if self.peek() == Some(',') => {
                    self.advance();
                    text.push(',');
                }
                _ => text.push(c),
            }
        }

        Some(Piece { text, line })
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.current).copied()
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.current];
        self.current += 1;
        c
    }
}

/// Tokenize source text
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).tokenize()
}

/// Classify one trimmed, non-empty piece
fn classify(text: &str, line: u32) -> Result<Token, LexError> {
    if let Some(value) = literals::literal(text, line)? {
        return Ok(Token::Literal(value));
    }
    keyword(text).ok_or_else(|| LexError::UnknownSyntax {
        line,
        text: text.to_string(),
    })
}

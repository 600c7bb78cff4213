//! Resolved programs
//!
//! A [`Program`] owns the token sequence, the label table and the operand
//! stack. It is produced by the resolver, can be persisted to the `.scb`
//! binary format, and is executed in place by the VM.

pub mod disasm;
mod serialize;

use crate::error::RuntimeError;
use crate::stack::Stack;
use crate::token::Token;
use crate::value::Value;
use serde::Serialize;
use serialize::{Reader, Writer};
use std::collections::HashMap;
use thiserror::Error;

/// Current `.scb` format version
///
/// Incremented on backward-incompatible format changes. Files with a
/// different version are rejected.
pub const FORMAT_VERSION: u16 = 1;

/// Magic bytes at the start of every `.scb` file
pub const MAGIC: &[u8; 4] = b"SCB\0";

/// File extension for persisted programs
pub const PROGRAM_EXTENSION: &str = "scb";

/// Errors decoding a persisted program
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error("not a Splash program: bad magic number")]
    BadMagic,
    #[error("format version mismatch: file has version {found}, this runtime supports version {expected}")]
    VersionMismatch { found: u16, expected: u16 },
    #[error("truncated data while reading {0}")]
    Truncated(&'static str),
    #[error("invalid UTF-8 in {0}")]
    InvalidUtf8(&'static str),
    #[error("unknown tag {tag:#04x} while reading {context}")]
    UnknownTag { tag: u8, context: &'static str },
    #[error("{0} trailing bytes after program data")]
    TrailingBytes(usize),
    #[error("{what} length {len} exceeds the format limit of {}", u32::MAX)]
    TooLarge { what: &'static str, len: usize },
}

/// A resolved program
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    /// Token sequence with patched `IF` / `FUNC` targets
    pub tokens: Vec<Token>,
    /// Label name -> token index of the label operand
    pub labels: HashMap<String, usize>,
    /// Operand stack
    pub stack: Stack,
}

impl Program {
    /// Create a program from already-resolved parts
    pub fn new(tokens: Vec<Token>, labels: HashMap<String, usize>, stack: Stack) -> Self {
        Self {
            tokens,
            labels,
            stack,
        }
    }

    /// Number of tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if the program has no tokens
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Label names sorted alphabetically with their indices
    pub fn sorted_labels(&self) -> Vec<(&str, usize)> {
        let mut labels: Vec<(&str, usize)> = self
            .labels
            .iter()
            .map(|(name, index)| (name.as_str(), *index))
            .collect();
        labels.sort();
        labels
    }

    /// The label operand of the instruction at `index`
    ///
    /// The token after `GOTO`, `MARK` and `FUNC` must be a string literal.
    pub fn label_operand(&self, index: usize) -> Result<&str, RuntimeError> {
        match self.tokens.get(index + 1) {
            Some(Token::Literal(Value::String(label))) => Ok(label),
            other => Err(RuntimeError::StructuralError {
                index,
                msg: format!(
                    "{} must be followed by a string label, found {}",
                    self.kind_name(index),
                    describe(other)
                ),
            }),
        }
    }

    /// The count operand of the instruction at `index`
    ///
    /// The token after `PICK` and `ROLL` must be a non-negative integer literal.
    pub fn count_operand(&self, index: usize) -> Result<usize, RuntimeError> {
        match self.tokens.get(index + 1) {
            Some(Token::Literal(Value::Int(count))) => {
                usize::try_from(*count).map_err(|_| RuntimeError::StructuralError {
                    index,
                    msg: format!("{} count must not be negative, found {}", self.kind_name(index), count),
                })
            }
            other => Err(RuntimeError::StructuralError {
                index,
                msg: format!(
                    "{} must be followed by an integer count, found {}",
                    self.kind_name(index),
                    describe(other)
                ),
            }),
        }
    }

    fn kind_name(&self, index: usize) -> &'static str {
        self.tokens
            .get(index)
            .map(|token| token.kind().name())
            .unwrap_or("<none>")
    }

    /// Serialize to the `.scb` binary format
    ///
    /// Format (big-endian):
    /// - Header: magic `SCB\0` + version u16 + flags u16
    /// - Tokens: count u32 + tagged tokens
    /// - Labels: count u32 + (name, index u32), sorted by name
    /// - Stack: count u32 + tagged values
    ///
    /// Fails with [`CodecError::TooLarge`] when a count or string length does
    /// not fit in a `u32`.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let mut writer = Writer::new();

        writer.bytes(MAGIC);
        writer.u16(FORMAT_VERSION);
        writer.u16(0); // flags (reserved)

        writer.len(self.tokens.len(), "tokens")?;
        for token in &self.tokens {
            writer.token(token)?;
        }

        let labels = self.sorted_labels();
        writer.len(labels.len(), "labels")?;
        for (name, index) in labels {
            writer.str(name)?;
            writer.len(index, "label index")?;
        }

        writer.len(self.stack.len(), "stack")?;
        for value in self.stack.as_slice() {
            writer.value(value)?;
        }

        Ok(writer.finish())
    }

    /// Deserialize from the `.scb` binary format
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut reader = Reader::new(bytes);

        let magic = reader.take(4, "header")?;
        if magic != MAGIC {
            return Err(CodecError::BadMagic);
        }
        let version = reader.u16("header")?;
        if version != FORMAT_VERSION {
            return Err(CodecError::VersionMismatch {
                found: version,
                expected: FORMAT_VERSION,
            });
        }
        let _flags = reader.u16("header")?;

        let token_count = reader.u32("token count")? as usize;
        let mut tokens = Vec::with_capacity(token_count.min(bytes.len()));
        for _ in 0..token_count {
            tokens.push(reader.token()?);
        }

        let label_count = reader.u32("label count")? as usize;
        let mut labels = HashMap::with_capacity(label_count.min(bytes.len()));
        for _ in 0..label_count {
            let name = reader.string("label name")?;
            let index = reader.u32("label index")? as usize;
            labels.insert(name, index);
        }

        let stack_len = reader.u32("stack length")? as usize;
        let mut values = Vec::with_capacity(stack_len.min(bytes.len()));
        for _ in 0..stack_len {
            values.push(reader.value("stack value")?);
        }

        let remaining = reader.remaining();
        if remaining > 0 {
            return Err(CodecError::TrailingBytes(remaining));
        }

        Ok(Self {
            tokens,
            labels,
            stack: Stack::from(values),
        })
    }

    /// Pretty JSON rendering of the program
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn describe(token: Option<&Token>) -> String {
    match token {
        Some(token) => token.to_string(),
        None => "end of program".to_string(),
    }
}

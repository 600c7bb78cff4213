//! Runtime errors
//!
//! Every condition here is fatal for the running program. Each variant records
//! the index of the token being executed (or resolved) when it occurred.

use crate::token::TokenKind;
use thiserror::Error;

/// Fatal resolution or execution error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// Malformed token adjacency, e.g. `MARK` not followed by a label
    #[error("structural error at token {index}: {msg}")]
    StructuralError { index: usize, msg: String },

    /// `GOTO` to a label that was never marked (strict mode only)
    #[error("unresolved label `{label}` at token {index}")]
    UnresolvedLabel { index: usize, label: String },

    /// Pop, peek or positional access beyond the stack depth
    #[error("stack underflow at token {index}")]
    StackUnderflow { index: usize },

    /// Operand of the wrong type
    #[error("type mismatch at token {index}: {msg}")]
    TypeMismatch { index: usize, msg: String },

    /// Integer division by zero
    #[error("arithmetic error at token {index}: {msg}")]
    ArithmeticError { index: usize, msg: String },

    /// `IF` or `FUNC` without a matching `ENDIF` / `ENDFUNC`
    #[error("{kind} at token {index} has no matching end marker")]
    MissingControlTarget { index: usize, kind: TokenKind },

    /// Writing program output failed
    #[error("I/O error at token {index}: {message}")]
    IoError { index: usize, message: String },
}

impl RuntimeError {
    /// Index of the token that raised the error
    pub fn index(&self) -> usize {
        match self {
            RuntimeError::StructuralError { index, .. }
            | RuntimeError::UnresolvedLabel { index, .. }
            | RuntimeError::StackUnderflow { index }
            | RuntimeError::TypeMismatch { index, .. }
            | RuntimeError::ArithmeticError { index, .. }
            | RuntimeError::MissingControlTarget { index, .. }
            | RuntimeError::IoError { index, .. } => *index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_index() {
        let err = RuntimeError::StackUnderflow { index: 7 };
        assert_eq!(err.index(), 7);

        let err = RuntimeError::MissingControlTarget {
            index: 2,
            kind: TokenKind::If,
        };
        assert_eq!(err.index(), 2);
    }

    #[test]
    fn test_error_messages() {
        let err = RuntimeError::MissingControlTarget {
            index: 3,
            kind: TokenKind::Func,
        };
        assert_eq!(err.to_string(), "FUNC at token 3 has no matching end marker");

        let err = RuntimeError::UnresolvedLabel {
            index: 0,
            label: "loop".to_string(),
        };
        assert_eq!(err.to_string(), "unresolved label `loop` at token 0");
    }
}

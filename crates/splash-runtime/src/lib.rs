//! Splash Runtime - Stack VM for comma-delimited scripts
//!
//! This library provides the complete Splash runtime including:
//! - Tokenization of source text
//! - Control-flow resolution (labels, `IF` / `FUNC` targets)
//! - Execution on an operand stack
//! - The `.scb` program format and a disassembler

/// Splash runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Public API modules
pub mod error;
pub mod lexer;
pub mod output;
pub mod program;
pub mod resolver;
pub mod runtime;
pub mod stack;
pub mod token;
pub mod value;
pub mod vm;

// Re-export commonly used types
pub use error::RuntimeError;
pub use lexer::{parse_value, tokenize, LexError, Lexer};
pub use output::{buffer_writer, stdout_writer, OutputWriter};
pub use program::disasm::disassemble;
pub use program::{CodecError, Program, FORMAT_VERSION, PROGRAM_EXTENSION};
pub use resolver::resolve;
pub use runtime::{is_compiled, Splash, SplashError, SplashResult};
pub use stack::Stack;
pub use token::{Token, TokenKind};
pub use value::Value;
pub use vm::{ExecOptions, VM};

//! Token types
//!
//! A token is either a literal operand or an instruction. Instructions that
//! need an operand take it from the token that follows them (`GOTO`, `MARK`,
//! `FUNC` take a label; `PICK`, `ROLL` take a count), except `IF` and `FUNC`,
//! whose jump targets are patched into the token by the resolver.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Instruction or literal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Token {
    /// Literal operand, pushed verbatim
    Literal(Value),
    /// Jump to the label named by the next token
    Goto,
    /// Mark a position under the label named by the next token
    Mark,
    /// Pop two values; skip to the matching `ENDIF` unless they are equal
    ///
    /// Holds the index of the matching `ENDIF` once resolved.
    If(Option<usize>),
    /// End of an `IF` block
    EndIf,
    /// Function entry, labelled by the next token
    ///
    /// Holds the index of the matching `ENDFUNC` once resolved.
    Func(Option<usize>),
    /// End of a function body
    EndFunc,
    /// Duplicate the top of stack
    Dup,
    /// Discard the top of stack
    Drop,
    /// Copy the n-th value from the top onto the top
    Pick,
    /// Move the n-th value from the top onto the top
    Roll,
    /// Halt
    Fin,
    /// Pop two, push sum
    Add,
    /// Pop two, push difference
    Sub,
    /// Pop two, push product
    Mul,
    /// Pop two, push quotient
    Div,
    /// Pop a string, push its SHA-256 hex digest
    Hash,
    /// Push the program input
    Input,
    /// Write the top of stack
    Print,
    /// Write the top of stack and a newline
    Println,
}

impl Token {
    /// Shorthand for an integer literal
    pub fn int(n: i64) -> Self {
        Token::Literal(Value::Int(n))
    }

    /// Shorthand for a float literal
    pub fn float(n: f64) -> Self {
        Token::Literal(Value::Float(n))
    }

    /// Shorthand for a string literal
    pub fn string(s: impl Into<String>) -> Self {
        Token::Literal(Value::String(s.into()))
    }

    /// Shorthand for a boolean literal
    pub fn bool(b: bool) -> Self {
        Token::Literal(Value::Bool(b))
    }

    /// Classification of this token
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Literal(Value::Int(_)) => TokenKind::Int,
            Token::Literal(Value::Float(_)) => TokenKind::Float,
            Token::Literal(Value::String(_)) => TokenKind::String,
            Token::Literal(Value::Bool(_)) => TokenKind::Bool,
            Token::Goto => TokenKind::Goto,
            Token::Mark => TokenKind::Mark,
            Token::If(_) => TokenKind::If,
            Token::EndIf => TokenKind::EndIf,
            Token::Func(_) => TokenKind::Func,
            Token::EndFunc => TokenKind::EndFunc,
            Token::Dup => TokenKind::Dup,
            Token::Drop => TokenKind::Drop,
            Token::Pick => TokenKind::Pick,
            Token::Roll => TokenKind::Roll,
            Token::Fin => TokenKind::Fin,
            Token::Add => TokenKind::Add,
            Token::Sub => TokenKind::Sub,
            Token::Mul => TokenKind::Mul,
            Token::Div => TokenKind::Div,
            Token::Hash => TokenKind::Hash,
            Token::Input => TokenKind::Input,
            Token::Print => TokenKind::Print,
            Token::Println => TokenKind::Println,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Literal(value) => write!(f, "{{{}: {}}}", self.kind(), value),
            Token::If(target) | Token::Func(target) => match target {
                Some(index) => write!(f, "{{{}: {}}}", self.kind(), index),
                None => write!(f, "{{{}: -1}}", self.kind()),
            },
            _ => write!(f, "{{{}}}", self.kind()),
        }
    }
}

/// Classification of tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Int,
    Float,
    String,
    Bool,
    Goto,
    Mark,
    If,
    EndIf,
    Func,
    EndFunc,
    Dup,
    Drop,
    Pick,
    Roll,
    Fin,
    Add,
    Sub,
    Mul,
    Div,
    Hash,
    Input,
    Print,
    Println,
}

impl TokenKind {
    /// Upper-case name, matching the source keyword for instructions
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Int => "INT",
            TokenKind::Float => "FLOAT",
            TokenKind::String => "STRING",
            TokenKind::Bool => "BOOLEAN",
            TokenKind::Goto => "GOTO",
            TokenKind::Mark => "MARK",
            TokenKind::If => "IF",
            TokenKind::EndIf => "ENDIF",
            TokenKind::Func => "FUNC",
            TokenKind::EndFunc => "ENDFUNC",
            TokenKind::Dup => "DUP",
            TokenKind::Drop => "DROP",
            TokenKind::Pick => "PICK",
            TokenKind::Roll => "ROLL",
            TokenKind::Fin => "FIN",
            TokenKind::Add => "ADD",
            TokenKind::Sub => "SUB",
            TokenKind::Mul => "MUL",
            TokenKind::Div => "DIV",
            TokenKind::Hash => "HASH",
            TokenKind::Input => "INPUT",
            TokenKind::Print => "PRINT",
            TokenKind::Println => "PRINTLN",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Look up an instruction keyword
///
/// Keywords are case-sensitive and upper-case. Control targets of `IF` and
/// `FUNC` start unresolved.
pub fn keyword(text: &str) -> Option<Token> {
    let token = match text {
        "GOTO" => Token::Goto,
        "MARK" => Token::Mark,
        "IF" => Token::If(None),
        "ENDIF" => Token::EndIf,
        "FUNC" => Token::Func(None),
        "ENDFUNC" => Token::EndFunc,
        "DUP" => Token::Dup,
        "DROP" => Token::Drop,
        "PICK" => Token::Pick,
        "ROLL" => Token::Roll,
        "FIN" => Token::Fin,
        "ADD" => Token::Add,
        "SUB" => Token::Sub,
        "MUL" => Token::Mul,
        "DIV" => Token::Div,
        "HASH" => Token::Hash,
        "INPUT" => Token::Input,
        "PRINT" => Token::Print,
        "PRINTLN" => Token::Println,
        _ => return None,
    };
    Some(token)
}

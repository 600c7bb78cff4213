//! Operand stack
//!
//! A LIFO of values that also supports positional access counted from the
//! top (1 = top). Out-of-range access returns `None`; the executor turns that
//! into a stack underflow error.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operand stack
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stack {
    values: Vec<Value>,
}

impl Stack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Create a stack holding the seed value (`Int 0`)
    pub fn seeded() -> Self {
        Self {
            values: vec![Value::Int(0)],
        }
    }

    /// Push a value on top
    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Remove and return the top value
    pub fn pop(&mut self) -> Option<Value> {
        self.values.pop()
    }

    /// The top value
    pub fn peek(&self) -> Option<&Value> {
        self.values.last()
    }

    /// The n-th value from the top (1 = top)
    pub fn peek_nth(&self, n: usize) -> Option<&Value> {
        let position = self.position(n)?;
        self.values.get(position)
    }

    /// Remove the n-th value from the top (1 = top), keeping the rest in order
    pub fn remove_nth(&mut self, n: usize) -> Option<Value> {
        let position = self.position(n)?;
        Some(self.values.remove(position))
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the stack holds no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values from bottom to top
    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }

    /// Vector index of the n-th value from the top
    fn position(&self, n: usize) -> Option<usize> {
        if n == 0 || n > self.values.len() {
            return None;
        }
        Some(self.values.len() - n)
    }
}

impl From<Vec<Value>> for Stack {
    fn from(values: Vec<Value>) -> Self {
        Self { values }
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{{{}:{}}}", value.type_name(), value)?;
        }
        write!(f, "]")
    }
}

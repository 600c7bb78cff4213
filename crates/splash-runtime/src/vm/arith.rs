//! Numeric operators
//!
//! `lhs` is the operand popped second (deeper in the stack) and `rhs` the one
//! popped first, so for a stack `[.., x, y]` subtraction yields `x - y`.
//! Two integers produce an integer; any float operand promotes the other
//! operand and produces a float.

use crate::value::Value;
use std::fmt;

/// Binary numeric operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BinaryOp::Add => "ADD",
            BinaryOp::Sub => "SUB",
            BinaryOp::Mul => "MUL",
            BinaryOp::Div => "DIV",
        };
        f.write_str(name)
    }
}

/// Why an operator could not produce a value
#[derive(Debug, Clone, PartialEq)]
pub enum ArithError {
    /// Operand is not a number
    NotNumeric { op: BinaryOp, found: &'static str },
    /// Integer division by zero
    DivisionByZero,
}

/// Apply `op` to `lhs` and `rhs`
pub fn apply(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, ArithError> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => int_op(op, *a, *b).map(Value::Int),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(float_op(op, *a, *b))),
        (Value::Int(a), Value::Float(b)) => Ok(Value::Float(float_op(op, *a as f64, *b))),
        (Value::Float(a), Value::Int(b)) => Ok(Value::Float(float_op(op, *a, *b as f64))),
        (Value::Int(_) | Value::Float(_), other) | (other, _) => Err(ArithError::NotNumeric {
            op,
            found: other.type_name(),
        }),
    }
}

/// Integer arithmetic wraps on overflow; division truncates toward zero
fn int_op(op: BinaryOp, a: i64, b: i64) -> Result<i64, ArithError> {
    match op {
        BinaryOp::Add => Ok(a.wrapping_add(b)),
        BinaryOp::Sub => Ok(a.wrapping_sub(b)),
        BinaryOp::Mul => Ok(a.wrapping_mul(b)),
        BinaryOp::Div => {
            if b == 0 {
                return Err(ArithError::DivisionByZero);
            }
            Ok(a.wrapping_div(b))
        }
    }
}

/// IEEE-754 semantics, including infinities and NaN
fn float_op(op: BinaryOp, a: f64, b: f64) -> f64 {
    match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
    }
}
